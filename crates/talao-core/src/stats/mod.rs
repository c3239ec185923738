//! Spending statistics: totals per article and per month.

mod aggregate;
mod names;

pub use aggregate::{
    aggregate, filter_articles, monthly_totals, summarize, AggregationOptions, ArticleSort,
    ArticleSummary, ArticleTotals, FractionalQuantityPolicy,
};
pub use names::{NameNormalizer, NameRule};
