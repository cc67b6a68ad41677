use crate::aggregate::{categorize, reconstruct_balances, DailyBalancePoint, ExpenseCategoryTotal};
use crate::commands::{signed_in, Out};
use crate::model::{Account, Amount, TransactionQuery};
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

/// Everything the dashboard view draws.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_balance: Amount,
    pub accounts: Vec<Account>,
    pub expenses: Vec<ExpenseCategoryTotal>,
    pub balances: Vec<DailyBalancePoint>,
}

/// Fetches accounts and the last `days` of transactions concurrently, then derives the expense
/// breakdown and the balance history ending on `today`. If either request fails the whole
/// command fails.
pub async fn dashboard(config: &Config, days: u32, today: NaiveDate) -> Result<Out<Dashboard>> {
    let (client, token) = signed_in(config).await?;
    let (accounts, transactions) = tokio::try_join!(
        client.list_accounts(Some(&token)),
        client.list_transactions(TransactionQuery::days(days), Some(&token)),
    )?;
    let accounts = accounts.accounts;
    let transactions = transactions.transactions;
    debug!(
        "Dashboard from {} accounts and {} transactions",
        accounts.len(),
        transactions.len()
    );

    let dashboard = Dashboard {
        total_balance: accounts.iter().map(Account::current).sum(),
        expenses: categorize(&transactions),
        balances: reconstruct_balances(&transactions, &accounts, today),
        accounts,
    };

    let mut message = format!(
        "Total balance {} across {} accounts",
        dashboard.total_balance,
        dashboard.accounts.len()
    );
    if dashboard.expenses.is_empty() {
        message.push_str("\nNo spending in this period");
    } else {
        message.push_str("\nSpending by category:");
        for group in &dashboard.expenses {
            let _ = write!(message, "\n  {:<24} {:>12}", group.name, group.value.to_string());
        }
    }
    if !dashboard.balances.is_empty() {
        message.push_str("\nBalance history:");
        for point in &dashboard.balances {
            let _ = write!(
                message,
                "\n  {:<6} {:>14}",
                point.display_date,
                point.value.to_string()
            );
        }
    }
    Ok(Out::new(message, dashboard))
}
