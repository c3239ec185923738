//! Rule-based extractors for supermarket receipts.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod lines;
pub mod metadata;
pub mod patterns;

pub use amounts::{extract_total, format_amount, parse_amount, round_money, TotalExtractor};
pub use dates::{extract_invoice_date, DateExtractor};
pub use items::LineItemMatcher;
pub use lines::{fold_key, normalize_text, preprocess};
pub use metadata::{extract_metadata, InvoiceMetadata};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
