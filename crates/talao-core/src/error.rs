//! Error types for the talao-core library.

use thiserror::Error;

/// Main error type for the talao library.
#[derive(Error, Debug)]
pub enum TalaoError {
    /// PDF processing error.
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[cfg(feature = "pdf")]
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has more pages than a receipt plausibly has.
    #[error("PDF has {0} pages, limit is {1}")]
    TooManyPages(usize, usize),

    /// No document has been loaded yet.
    #[error("no document loaded")]
    NotLoaded,
}

/// Errors related to receipt extraction.
///
/// Malformed lines never produce an error; they are skipped by the matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The input is not text.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the talao library.
pub type Result<T> = std::result::Result<T, TalaoError>;
