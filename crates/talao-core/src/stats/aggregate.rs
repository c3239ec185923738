//! Spending statistics over snapshots of parsed receipts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::names::NameNormalizer;
use crate::models::config::AggregationConfig;
use crate::models::receipt::{LineItem, ParsedReceipt};

/// What to do with items sold by weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionalQuantityPolicy {
    /// Count weighed goods like any other item.
    Include,
    /// Leave items with fractional quantities out of the statistics.
    #[default]
    Exclude,
}

/// Ordering of article reports (always descending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSort {
    #[default]
    Quantity,
    Total,
}

/// Accumulated quantity and spending for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTotals {
    pub quantity: Decimal,
    pub total: Decimal,
    /// Number of receipt lines merged into this entry.
    pub lines: usize,
}

/// One row of an article report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub name: String,
    pub quantity: Decimal,
    pub total: Decimal,
}

/// Options for [`aggregate`].
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    pub normalizer: NameNormalizer,
    pub fractional: FractionalQuantityPolicy,
}

impl AggregationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AggregationConfig) -> Self {
        Self {
            normalizer: NameNormalizer::from_config(&config.name_rules),
            fractional: config.fractional_quantities,
        }
    }

    pub fn with_normalizer(mut self, normalizer: NameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_fractional(mut self, policy: FractionalQuantityPolicy) -> Self {
        self.fractional = policy;
        self
    }
}

/// Sum quantity and price per normalized article name.
pub fn aggregate<'a, I>(items: I, options: &AggregationOptions) -> BTreeMap<String, ArticleTotals>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut totals: BTreeMap<String, ArticleTotals> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut overflowed = 0usize;

    for item in items {
        if options.fractional == FractionalQuantityPolicy::Exclude && item.is_fractional() {
            skipped += 1;
            continue;
        }

        let entry = totals
            .entry(options.normalizer.normalize(&item.name))
            .or_default();

        match (
            entry.quantity.checked_add(item.quantity),
            entry.total.checked_add(item.price),
        ) {
            (Some(quantity), Some(total)) => {
                entry.quantity = quantity;
                entry.total = total;
                entry.lines += 1;
            }
            _ => {
                warn!("Skipping {:?}: article totals would overflow", item.name);
                overflowed += 1;
            }
        }
    }

    debug!(
        "Aggregated {} articles ({} weighed items skipped, {} overflowing items skipped)",
        totals.len(),
        skipped,
        overflowed
    );

    totals
}

/// Flatten aggregated totals into report rows, largest first.
pub fn summarize(totals: &BTreeMap<String, ArticleTotals>, sort: ArticleSort) -> Vec<ArticleSummary> {
    let mut rows: Vec<ArticleSummary> = totals
        .iter()
        .map(|(name, t)| ArticleSummary {
            name: name.clone(),
            quantity: t.quantity,
            total: t.total,
        })
        .collect();

    rows.sort_by(|a, b| {
        let primary = match sort {
            ArticleSort::Quantity => b.quantity.cmp(&a.quantity),
            ArticleSort::Total => b.total.cmp(&a.total),
        };
        primary.then_with(|| a.name.cmp(&b.name))
    });

    rows
}

/// Keep rows whose name contains `term`, ignoring case.
pub fn filter_articles(rows: Vec<ArticleSummary>, term: &str) -> Vec<ArticleSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| row.name.to_lowercase().contains(&term))
        .collect()
}

/// Printed totals per month (`YYYY-MM`).
///
/// Receipts without a date or a printed total are left out.
pub fn monthly_totals<'a, I>(receipts: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a ParsedReceipt>,
{
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();

    for receipt in receipts {
        if let (Some(month), Some(total)) = (receipt.month_key(), receipt.total) {
            let sum = months.entry(month).or_insert(Decimal::ZERO);
            match sum.checked_add(total) {
                Some(next) => *sum = next,
                None => warn!("Skipping receipt total {}: monthly total would overflow", total),
            }
        }
    }

    months
}
