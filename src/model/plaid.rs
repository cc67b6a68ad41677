//! Payloads for the account-linking (Plaid) endpoints and the data they expose.

use crate::model::{Account, Transaction};
use serde::{Deserialize, Serialize};

/// Default lookback used by the transaction list.
pub const DEFAULT_DAYS: u32 = 30;

/// Default lookback used when only stock transactions are requested.
pub const DEFAULT_STOCK_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Query parameters for `GET plaid/transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub days: u32,
    pub stock_only: bool,
    pub include_custom: bool,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            stock_only: false,
            include_custom: true,
        }
    }
}

impl TransactionQuery {
    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Default::default()
        }
    }

    /// Investment transactions only, over the stock lookback.
    pub fn stocks() -> Self {
        Self {
            days: DEFAULT_STOCK_DAYS,
            stock_only: true,
            include_custom: true,
        }
    }

    pub(crate) fn to_pairs(self) -> [(&'static str, String); 3] {
        [
            ("days", self.days.to_string()),
            ("stock_only", self.stock_only.to_string()),
            ("include_custom", self.include_custom.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
    pub days: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<Account>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_transactions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl TransactionsResponse {
    /// The transactions sorted newest first, as a list view shows them.
    pub fn newest_first(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date().cmp(&a.date()));
        sorted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTokenResponse {
    pub link_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub public_token: String,
}

/// Sent during signup, when there is no bearer token yet. The phone number correlates the linked
/// item with the user being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupExchangeRequest {
    pub public_token: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub plaid_connected: Option<bool>,
}

/// The signup exchange also returns the first page of data for the linked item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupExchangeResponse {
    #[serde(flatten)]
    pub exchange: ExchangeResponse,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub plaid_connected: bool,
}
