use crate::commands::{signed_in, Out};
use crate::model::{Settings, SettingsUpdate};
use crate::{Config, Result};

fn describe(settings: &Settings) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    format!(
        "Notification time       {}\n\
         Timezone                {}\n\
         Model                   {} (temperature {})\n\
         Weekly finance summary  {} at {}\n\
         Weekly stock summary    {} at {}",
        settings.notification_time,
        settings.timezone,
        settings.model,
        settings.temperature,
        on_off(settings.financial_weekly_summary),
        settings.financial_weekly_summary_time,
        on_off(settings.stock_weekly_summary),
        settings.stock_weekly_summary_time,
    )
}

/// Shows the signed-in user's settings. Users who never saved any get the defaults.
pub async fn settings_get(config: &Config) -> Result<Out<Settings>> {
    let (client, token) = signed_in(config).await?;
    let settings = client.get_settings(Some(&token)).await?.settings;
    Ok(Out::new(describe(&settings), settings))
}

/// Saves the fields set in `update` and shows the merged result.
pub async fn settings_set(config: &Config, update: SettingsUpdate) -> Result<Out<Settings>> {
    let (client, token) = signed_in(config).await?;
    let response = client.update_settings(&update, Some(&token)).await?;
    let heading = response
        .message
        .unwrap_or_else(|| "Settings updated".to_string());
    let message = format!("{heading}\n{}", describe(&response.settings));
    Ok(Out::new(message, response.settings))
}
