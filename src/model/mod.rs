//! Types that represent the data exchanged with the Finn backend, such as `Transaction` and
//! `Account`. Every response is parsed into one of these at the API boundary.
mod account;
mod amount;
pub mod auth;
mod chat;
pub mod plaid;
pub mod settings;
mod transaction;

pub use account::{Account, Balances};
pub use amount::Amount;
pub use auth::{Ack, Tokens, VerifyResponse};
pub use chat::{ChatRequest, ChatResponse};
pub use plaid::{
    AccountStatus, AccountsResponse, ExchangeResponse, LinkTokenResponse, SignupExchangeResponse,
    TransactionQuery, TransactionsResponse,
};
pub use settings::{Settings, SettingsResponse, SettingsUpdate, SettingsUpdateResponse};
pub use transaction::{StockDetails, Transaction};
