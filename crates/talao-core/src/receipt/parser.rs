//! Rule-based receipt parser.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ParserConfig;
use crate::models::receipt::ParsedReceipt;

use super::rules::{extract_metadata, normalize_text, preprocess, LineItemMatcher};
use super::Result;

/// Result of receipt extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Extracted receipt data.
    pub receipt: ParsedReceipt,
    /// Number of non-empty lines scanned.
    pub lines_scanned: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt from extracted text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;

    /// Parse a receipt from raw bytes, which must be UTF-8 text.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ExtractionError::InvalidInput(format!("input is not UTF-8 text: {}", e))
        })?;
        self.parse(text)
    }
}

/// Receipt parser built on line regexes.
///
/// Holds no state between calls; one instance can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct RuleReceiptParser {
    matcher: LineItemMatcher,
    currency: String,
}

impl RuleReceiptParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            matcher: LineItemMatcher::from_config(config),
            currency: config.currency.clone(),
        }
    }

    /// Set printed-total preference for two-line items.
    pub fn with_printed_total_preference(mut self, prefer: bool) -> Self {
        self.matcher = self.matcher.with_printed_total_preference(prefer);
        self
    }

    /// Replace the summary keyword list.
    pub fn with_summary_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.matcher = self.matcher.with_summary_keywords(keywords);
        self
    }

    /// Set the currency assigned to parsed receipts.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl Default for RuleReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for RuleReceiptParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        if text.contains('\0') {
            return Err(ExtractionError::InvalidInput(
                "input contains NUL characters, expected extracted text".to_string(),
            ));
        }

        info!("Parsing receipt from {} characters of text", text.len());

        let lines = preprocess(text);
        let items = self.matcher.scan(&lines);
        let metadata = extract_metadata(&normalize_text(text));

        let receipt = ParsedReceipt {
            invoice_date: metadata.date(),
            total: metadata.total(),
            currency: self.currency.clone(),
            items,
        };

        let warnings = receipt.validate();

        debug!(
            "Extracted {} items from {} lines (date: {:?}, total: {:?})",
            receipt.items.len(),
            lines.len(),
            receipt.invoice_date,
            receipt.total
        );

        Ok(ExtractionResult {
            receipt,
            lines_scanned: lines.len(),
            warnings,
        })
    }
}
