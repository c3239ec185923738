//! Receipt line item extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, ReceiptParser, RuleReceiptParser};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
