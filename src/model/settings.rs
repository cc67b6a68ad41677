use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_TIME: &str = "09:00";
pub const DEFAULT_MODEL: &str = "gpt4";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// A user's notification and assistant preferences.
///
/// Fields the backend omits take their documented default, so a partially populated settings
/// document still yields a complete `Settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notification_time: String,
    pub model: String,
    pub temperature: f64,
    pub timezone: String,
    pub financial_weekly_summary: bool,
    pub financial_weekly_summary_time: String,
    pub stock_weekly_summary: bool,
    pub stock_weekly_summary_time: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timezone: DEFAULT_TIMEZONE.to_string(),
            financial_weekly_summary: true,
            financial_weekly_summary_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            stock_weekly_summary: true,
            stock_weekly_summary_time: DEFAULT_NOTIFICATION_TIME.to_string(),
        }
    }
}

/// Response of `GET settings/get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<serde_json::Value>,
}

impl SettingsResponse {
    /// What the client uses when the backend has no settings stored for the user.
    pub fn defaults() -> Self {
        Self::default()
    }
}

/// A partial update. Only the fields that are `Some` are sent; the backend merges them over the
/// stored settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_weekly_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_weekly_summary_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_weekly_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_weekly_summary_time: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self == &SettingsUpdate::default()
    }
}

/// Response of `POST settings/update`: the merged settings echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.notification_time, "09:00");
        assert_eq!(s.model, "gpt4");
        assert_eq!(s.temperature, 0.7);
        assert_eq!(s.timezone, "America/New_York");
        assert!(s.financial_weekly_summary);
        assert!(s.stock_weekly_summary);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"settings": {"model": "claude", "temperature": 0.2}}"#;
        let r: SettingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.settings.model, "claude");
        assert_eq!(r.settings.temperature, 0.2);
        assert_eq!(r.settings.timezone, DEFAULT_TIMEZONE);
        assert!(r.budgets.is_none());
    }

    #[test]
    fn test_update_only_sends_set_fields() {
        let update = SettingsUpdate {
            timezone: Some("Europe/Berlin".to_string()),
            stock_weekly_summary: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timezone": "Europe/Berlin", "stock_weekly_summary": false})
        );
        assert!(!update.is_empty());
        assert!(SettingsUpdate::default().is_empty());
    }
}
