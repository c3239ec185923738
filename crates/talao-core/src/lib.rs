//! Core library for supermarket receipt processing.
//!
//! This crate provides:
//! - PDF text extraction (feature `pdf`)
//! - Receipt line-item extraction (single-line and two-line rows)
//! - Invoice date and printed total extraction
//! - Spending statistics per article and per month

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod receipt;
pub mod stats;

pub use error::{ExtractionError, Result, TalaoError};
pub use models::config::TalaoConfig;
pub use models::receipt::{LineItem, ParsedReceipt};
#[cfg(feature = "pdf")]
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use receipt::{ExtractionResult, ReceiptParser, RuleReceiptParser};
pub use stats::{
    aggregate, filter_articles, monthly_totals, summarize, AggregationOptions, ArticleSort,
    ArticleSummary, ArticleTotals, FractionalQuantityPolicy, NameNormalizer, NameRule,
};
