use crate::aggregate::colors::category_color;
use crate::model::{Amount, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The group name for transactions without a category, and for the collapsed tail.
pub const OTHER: &str = "Other";

/// At most this many groups are returned as they are. Past it, the tail collapses into "Other".
pub const MAX_GROUPS: usize = 6;

/// How many of the largest groups survive a collapse.
const KEEP_ON_COLLAPSE: usize = 5;

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategoryTotal {
    pub name: String,
    pub value: Amount,
    pub color: String,
}

impl ExpenseCategoryTotal {
    fn new(name: impl Into<String>, value: Amount) -> Self {
        let name = name.into();
        let color = category_color(&name).to_string();
        Self { name, value, color }
    }
}

/// Totals outflows (positive amounts) by their primary category, largest first.
///
/// Groups with equal totals are ordered by name. When there are more than `MAX_GROUPS` groups,
/// the five largest are kept in order and the rest are summed into an "Other" group appended last.
/// If one of the five is already "Other", the tail is added to it in place.
pub fn categorize(transactions: &[Transaction]) -> Vec<ExpenseCategoryTotal> {
    let mut sums: BTreeMap<&str, Amount> = BTreeMap::new();
    for transaction in transactions.iter().filter(|t| t.amount().is_positive()) {
        let name = transaction.primary_category().unwrap_or(OTHER);
        *sums.entry(name).or_default() += transaction.amount();
    }

    let mut groups: Vec<ExpenseCategoryTotal> = sums
        .into_iter()
        .map(|(name, sum)| ExpenseCategoryTotal::new(name, sum.round_cents()))
        .collect();
    sort_descending(&mut groups);

    if groups.len() <= MAX_GROUPS {
        return groups;
    }

    let tail = groups.split_off(KEEP_ON_COLLAPSE);
    let rest: Amount = tail.iter().map(|g| g.value).sum();
    if rest.is_positive() {
        match groups.iter_mut().find(|g| g.name == OTHER) {
            Some(other) => other.value += rest,
            None => groups.push(ExpenseCategoryTotal::new(OTHER, rest)),
        }
    }
    groups
}

// Stable, so ties keep their alphabetical order from the map.
fn sort_descending(groups: &mut [ExpenseCategoryTotal]) {
    groups.sort_by(|a, b| b.value.cmp(&a.value));
}
