//! Pure transforms from fetched transactions and accounts to the figures the dashboard shows.
//!
//! Nothing here does I/O or reads the clock; "today" is always passed in.

mod balance;
mod categorize;
mod colors;

pub use balance::{
    daily_balance_series, downsample, reconstruct_balances, DailyBalancePoint, WINDOW_DAYS,
};
pub use categorize::{categorize, ExpenseCategoryTotal, MAX_GROUPS, OTHER};
pub use colors::{category_color, NEUTRAL_GRAY};
