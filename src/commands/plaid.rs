//! Accounts, transactions and bank linking.

use crate::commands::{signed_in, Out};
use crate::model::{
    Account, AccountStatus, Amount, ExchangeResponse, LinkTokenResponse, Transaction,
    TransactionQuery,
};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// Lists the linked accounts and their current balances.
pub async fn accounts(config: &Config) -> Result<Out<Vec<Account>>> {
    let (client, token) = signed_in(config).await?;
    let accounts = client.list_accounts(Some(&token)).await?.accounts;
    if accounts.is_empty() {
        return Ok(Out::new(
            "No accounts linked, run 'finn link token' to connect a bank",
            accounts,
        ));
    }
    let total: Amount = accounts.iter().map(Account::current).sum();
    let mut message = format!("{} accounts, total balance {total}", accounts.len());
    for account in &accounts {
        let kind = account
            .subtype
            .as_deref()
            .or(account.account_type.as_deref())
            .unwrap_or("account");
        let _ = write!(
            message,
            "\n  {:<40} {:<12} {:>14}",
            account.label(),
            kind,
            account.current().to_string()
        );
    }
    Ok(Out::new(message, accounts))
}

/// Lists transactions newest first, as a ledger with credits shown as `+` and debits as `-`.
pub async fn transactions(
    config: &Config,
    query: TransactionQuery,
) -> Result<Out<Vec<Transaction>>> {
    let (client, token) = signed_in(config).await?;
    let response = client.list_transactions(query, Some(&token)).await?;
    let transactions: Vec<Transaction> = response.newest_first().into_iter().cloned().collect();

    let what = if query.stock_only {
        "stock transactions"
    } else {
        "transactions"
    };
    let mut message = format!(
        "{} {what} in the last {} days",
        transactions.len(),
        query.days
    );
    for transaction in &transactions {
        let _ = write!(message, "\n  {}", ledger_line(transaction));
    }
    Ok(Out::new(message, transactions))
}

fn ledger_line(transaction: &Transaction) -> String {
    let category = transaction.primary_category().unwrap_or("Uncategorized");
    let pending = if transaction.is_pending() {
        " (pending)"
    } else {
        ""
    };
    format!(
        "{}  {:>12}  {}{pending}  [{category}]",
        transaction.date(),
        transaction.amount().ledger_display(),
        transaction.name()
    )
}

/// Creates a Plaid Link token for connecting a bank.
pub async fn link_token(config: &Config) -> Result<Out<LinkTokenResponse>> {
    let (client, token) = signed_in(config).await?;
    let link = client.create_link_token(Some(&token)).await?;
    let message = match &link.expiration {
        Some(expiration) => format!("Link token {} (expires {expiration})", link.link_token),
        None => format!("Link token {}", link.link_token),
    };
    Ok(Out::new(message, link))
}

#[derive(Debug, Clone, Serialize)]
pub struct Linked {
    #[serde(flatten)]
    pub exchange: ExchangeResponse,
    /// Filled in only by the signup exchange, which returns the first page of data right away.
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Exchanges a Plaid public token after the user finishes Plaid Link.
///
/// With `signup_phone`, the exchange is for a user who is still signing up and has no session
/// yet, so no bearer token is needed.
pub async fn link_exchange(
    config: &Config,
    public_token: &str,
    signup_phone: Option<&str>,
) -> Result<Out<Linked>> {
    let linked = match signup_phone {
        Some(phone) => {
            let client = config.api_client()?;
            let response = client
                .exchange_public_token_signup(public_token, phone)
                .await?;
            Linked {
                exchange: response.exchange,
                accounts: response.accounts,
                transactions: response.transactions,
            }
        }
        None => {
            let (client, token) = signed_in(config).await?;
            Linked {
                exchange: client
                    .exchange_public_token(public_token, Some(&token))
                    .await?,
                accounts: Vec::new(),
                transactions: Vec::new(),
            }
        }
    };
    let message = linked
        .exchange
        .message
        .clone()
        .unwrap_or_else(|| "Bank account linked".to_string());
    Ok(Out::new(message, linked))
}

/// Reports whether a bank is linked.
pub async fn link_status(config: &Config) -> Result<Out<AccountStatus>> {
    let (client, token) = signed_in(config).await?;
    let status = client.account_status(Some(&token)).await?;
    let message = if status.plaid_connected {
        "A bank account is linked"
    } else {
        "No bank account is linked, run 'finn link token' to connect one"
    };
    Ok(Out::new(message, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::test::TestEnv;

    const ACCOUNTS: &str = r#"{"accounts": [
        {"account_id": "a1", "name": "Checking", "mask": "0000", "type": "depository",
         "subtype": "checking", "balances": {"available": 100, "current": 110, "iso_currency_code": "USD"}},
        {"account_id": "a2", "name": "Savings", "mask": "1111", "type": "depository",
         "subtype": "savings", "balances": {"available": null, "current": 210.5, "iso_currency_code": "USD"}}
    ]}"#;

    const TRANSACTIONS: &str = r#"{
        "transactions": [
            {"transaction_id": "t1", "date": "2024-03-01", "name": "Uber", "amount": 5.4,
             "category": ["Travel", "Taxi"], "pending": false},
            {"transaction_id": "t2", "date": "2024-03-05", "name": "Payroll", "amount": -500,
             "category": null, "pending": true}
        ],
        "total_transactions": 2
    }"#;

    fn assert_auth_required(err: &anyhow::Error) {
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_protected_commands_require_session() {
        let env = TestEnv::new().await;
        let config = env.config();

        assert_auth_required(&accounts(&config).await.unwrap_err());
        assert_auth_required(
            &transactions(&config, TransactionQuery::default())
                .await
                .unwrap_err(),
        );
        assert_auth_required(&link_token(&config).await.unwrap_err());
        assert_auth_required(&link_status(&config).await.unwrap_err());
        assert_auth_required(&link_exchange(&config, "public", None).await.unwrap_err());

        assert!(env.backend().requests().is_empty());
    }

    #[tokio::test]
    async fn test_accounts() {
        let env = TestEnv::new().await;
        let token = env.sign_in().await;
        env.backend()
            .route("GET", "/api/plaid/accounts", 200, ACCOUNTS);

        let out = accounts(&env.config()).await.unwrap();

        assert_eq!(out.structure().unwrap().len(), 2);
        assert!(out.message().starts_with("2 accounts, total balance $320.50"));
        assert!(out.message().contains("Checking (••••0000)"));
        let requests = env.backend().requests();
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some(format!("Bearer {token}").as_str())
        );
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let env = TestEnv::new().await;
        env.sign_in().await;
        env.backend()
            .route("GET", "/api/plaid/transactions", 200, TRANSACTIONS);

        let out = transactions(&env.config(), TransactionQuery::days(7))
            .await
            .unwrap();

        let ids: Vec<&str> = out.structure().unwrap().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert!(out.message().contains("+$500.00  Payroll (pending)  [Uncategorized]"));
        assert!(out.message().contains("-$5.40  Uber  [Travel]"));
        let uri = &env.backend().requests()[0].uri;
        assert!(uri.contains("days=7"), "{uri}");
        assert!(uri.contains("stock_only=false"), "{uri}");
        assert!(uri.contains("include_custom=true"), "{uri}");
    }

    #[tokio::test]
    async fn test_signup_exchange_needs_no_session() {
        let env = TestEnv::new().await;
        env.backend().route(
            "POST",
            "/api/plaid/signup-transactions",
            200,
            r#"{"message": "Linked", "item_id": "item-1", "access_token": "secret",
                "transactions": [], "accounts": []}"#,
        );

        let out = link_exchange(&env.config(), "public-sandbox", Some("5551234567"))
            .await
            .unwrap();

        assert_eq!(out.message(), "Linked");
        assert_eq!(
            out.structure().unwrap().exchange.item_id.as_deref(),
            Some("item-1")
        );
        let request = &env.backend().requests()[0];
        assert_eq!(request.authorization, None);
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["phone_number"], "+15551234567");
        assert_eq!(body["public_token"], "public-sandbox");
    }

    #[tokio::test]
    async fn test_link_token() {
        let env = TestEnv::new().await;
        env.sign_in().await;
        env.backend().route(
            "POST",
            "/api/plaid/create-link-token",
            200,
            r#"{"link_token": "link-sandbox-123", "expiration": "2024-03-31T12:00:00Z"}"#,
        );

        let out = link_token(&env.config()).await.unwrap();

        assert_eq!(out.structure().unwrap().link_token, "link-sandbox-123");
        assert_eq!(
            out.message(),
            "Link token link-sandbox-123 (expires 2024-03-31T12:00:00Z)"
        );
    }

    #[tokio::test]
    async fn test_link_exchange_signed_in() {
        let env = TestEnv::new().await;
        let token = env.sign_in().await;
        env.backend().route(
            "POST",
            "/api/plaid/exchange-public-token",
            200,
            r#"{"access_token": "access-sandbox", "item_id": "item-9", "plaid_connected": true}"#,
        );

        let out = link_exchange(&env.config(), "public-sandbox", None)
            .await
            .unwrap();

        assert_eq!(out.message(), "Bank account linked");
        let linked = out.structure().unwrap();
        assert_eq!(linked.exchange.plaid_connected, Some(true));
        assert!(linked.accounts.is_empty());
        let request = &env.backend().requests()[0];
        assert_eq!(
            request.authorization.as_deref(),
            Some(format!("Bearer {token}").as_str())
        );
        assert!(!serde_json::to_string(linked).unwrap().contains("access-sandbox"));
    }

    #[tokio::test]
    async fn test_link_status() {
        let env = TestEnv::new().await;
        env.sign_in().await;
        env.backend().route(
            "GET",
            "/api/plaid/account-status",
            200,
            r#"{"plaid_connected": true}"#,
        );
        let out = link_status(&env.config()).await.unwrap();
        assert!(out.structure().unwrap().plaid_connected);
    }
}
