use crate::commands::{signed_in, Out};
use crate::model::ChatResponse;
use crate::{Config, Result};

/// Sends one message to the assistant and returns its reply.
pub async fn chat(config: &Config, message: &str) -> Result<Out<ChatResponse>> {
    let (client, token) = signed_in(config).await?;
    let reply = client.send_chat_message(message, Some(&token)).await?;
    Ok(Out::new(reply.response.clone(), reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_chat() {
        let env = TestEnv::new().await;
        env.sign_in().await;
        env.backend().route(
            "POST",
            "/api/chatbot/chat",
            200,
            r#"{"response": "You spent $42 on coffee this month."}"#,
        );

        let out = chat(&env.config(), "How much did I spend on coffee?")
            .await
            .unwrap();

        assert_eq!(out.message(), "You spent $42 on coffee this month.");
        let body: serde_json::Value =
            serde_json::from_str(&env.backend().requests()[0].body).unwrap();
        assert_eq!(body["message"], "How much did I spend on coffee?");
    }

    #[tokio::test]
    async fn test_chat_backend_error_message() {
        let env = TestEnv::new().await;
        env.sign_in().await;
        env.backend().route(
            "POST",
            "/api/chatbot/chat",
            500,
            r#"{"msg": "Model unavailable"}"#,
        );
        let err = chat(&env.config(), "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "Model unavailable");
    }
}
