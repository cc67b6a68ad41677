use crate::model::{Account, Amount, Transaction};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The series covers this many days before today, plus today.
pub const WINDOW_DAYS: i64 = 30;

/// Series longer than this are downsampled.
pub const DOWNSAMPLE_THRESHOLD: usize = 10;

/// Every `DOWNSAMPLE_STRIDE`th interior point survives downsampling.
pub const DOWNSAMPLE_STRIDE: usize = 3;

/// The approximate total balance across all accounts at the end of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBalancePoint {
    /// `M/D`, without leading zeros.
    pub display_date: String,
    pub full_date: NaiveDate,
    pub value: Amount,
}

impl DailyBalancePoint {
    fn new(full_date: NaiveDate, value: Amount) -> Self {
        Self {
            display_date: display_date(full_date),
            full_date,
            value,
        }
    }
}

fn display_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Reconstructs the balance history over the trailing window and downsamples it for charting.
pub fn reconstruct_balances(
    transactions: &[Transaction],
    accounts: &[Account],
    today: NaiveDate,
) -> Vec<DailyBalancePoint> {
    downsample(daily_balance_series(transactions, accounts, today))
}

/// Walks backward from the summed current balance of `accounts`, undoing each transaction in the
/// window, to approximate the balance on every day from `today - WINDOW_DAYS` to `today`.
///
/// Undoing a transaction adds its amount back, since a positive amount is money that left. The
/// balance recorded for a date is the one reached after undoing that date's earliest transaction.
/// A day with no transactions takes the value of the closest earlier day that has one, or else the
/// earliest recorded value, or else the current total. Returns no points when there are no
/// accounts.
pub fn daily_balance_series(
    transactions: &[Transaction],
    accounts: &[Account],
    today: NaiveDate,
) -> Vec<DailyBalancePoint> {
    if accounts.is_empty() {
        return Vec::new();
    }
    let current_total: Amount = accounts.iter().map(Account::current).sum();
    let start = today - Duration::days(WINDOW_DAYS);

    let mut in_window: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.date() >= start && t.date() <= today)
        .collect();
    in_window.sort_by_key(|t| t.date());

    let mut recorded: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
    let mut running = current_total;
    for transaction in in_window.iter().rev() {
        running += transaction.amount();
        recorded.insert(transaction.date(), running);
    }
    let earliest = recorded.values().next().copied();

    let mut points: Vec<DailyBalancePoint> = start
        .iter_days()
        .take_while(|day| *day < today)
        .map(|day| {
            let value = recorded
                .range(..=day)
                .next_back()
                .map(|(_, value)| *value)
                .or(earliest)
                .unwrap_or(current_total);
            DailyBalancePoint::new(day, value)
        })
        .collect();
    let today_value = recorded.get(&today).copied().unwrap_or(current_total);
    points.push(DailyBalancePoint::new(today, today_value));

    points.sort_by_key(|p| p.full_date);
    dedup_by_display_date(points)
}

// Later points win over earlier points with the same label.
fn dedup_by_display_date(points: Vec<DailyBalancePoint>) -> Vec<DailyBalancePoint> {
    let mut deduped: Vec<DailyBalancePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped
            .iter()
            .position(|p| p.display_date == point.display_date)
        {
            Some(i) => {
                deduped.remove(i);
                deduped.push(point);
            }
            None => deduped.push(point),
        }
    }
    deduped
}

/// Thins a long series for display. The first and last points are always kept.
pub fn downsample(points: Vec<DailyBalancePoint>) -> Vec<DailyBalancePoint> {
    if points.len() <= DOWNSAMPLE_THRESHOLD {
        return points;
    }
    let last = points.len() - 1;
    points
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i == 0 || *i == last || i % DOWNSAMPLE_STRIDE == 0)
        .map(|(_, point)| point)
        .collect()
}
