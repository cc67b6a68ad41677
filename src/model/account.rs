use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A snapshot of one linked account. `balances.current` anchors the reconstructed balance series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    pub balances: Balances,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(default)]
    pub available: Option<Amount>,
    pub current: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Amount>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

impl Account {
    pub fn current(&self) -> Amount {
        self.balances.current
    }

    /// e.g. `Plaid Checking (••••0000)`
    pub fn label(&self) -> String {
        match &self.mask {
            Some(mask) => format!("{} (••••{mask})", self.name),
            None => self.name.clone(),
        }
    }
}
