use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A single transaction as returned by the backend's Plaid proxy.
///
/// `amount` is signed: positive is a debit (outflow), negative is a credit (inflow). `category` is
/// ordered from the most specific to the least specific label, so the first entry is the one used
/// for grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "transaction_id", alias = "id")]
    id: String,
    #[serde(deserialize_with = "iso_date")]
    date: NaiveDate,
    #[serde(default)]
    name: String,
    amount: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    category: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    is_custom: bool,
    #[serde(default)]
    is_stock: bool,
    #[serde(flatten)]
    stock: StockDetails,
}

/// Extra fields present on investment transactions (`is_stock == true`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shares: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_share: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        name: impl Into<String>,
        amount: Amount,
        category: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            name: name.into(),
            amount,
            category,
            account_id: None,
            pending: false,
            is_custom: false,
            is_stock: false,
            stock: StockDetails::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &[String] {
        &self.category
    }

    /// The most specific category label, if any.
    /// The top-level category. A blank first entry counts as no category.
    pub fn primary_category(&self) -> Option<&str> {
        self.category
            .first()
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_stock(&self) -> bool {
        self.is_stock
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn stock(&self) -> &StockDetails {
        &self.stock
    }

    /// True when money left the account.
    pub fn is_debit(&self) -> bool {
        self.amount.is_positive()
    }
}

/// Accepts `YYYY-MM-DD` as well as a full timestamp whose first ten characters are the date.
fn iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let date_part = s.get(..10).unwrap_or(&s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
