//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// PDF text extractor.
///
/// `lopdf` handles loading, decryption and analysis; the text itself comes
/// from `pdf-extract`, which reads from the (decrypted) raw bytes.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    max_pages: usize,
    min_text_length: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text (empty for scanned documents).
    pub text: String,
    /// Number of pages.
    pub page_count: u32,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: config.max_pages,
            min_text_length: config.min_text_length,
        }
    }

    /// Limit the number of pages accepted by [`PdfProcessor::load`] (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Minimum number of non-whitespace characters for a text PDF.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Analyze the loaded PDF and extract its text in one pass.
    pub fn extract_all(&self) -> Result<PdfContent> {
        if self.document.is_none() {
            return Err(PdfError::NotLoaded);
        }

        let text = self.text_or_empty();
        let pdf_type = self.classify(&text);

        Ok(PdfContent {
            pdf_type,
            text: if pdf_type == PdfType::Text { text } else { String::new() },
            page_count: self.page_count(),
        })
    }

    /// Text of the document, or nothing when pdf-extract cannot read it.
    fn text_or_empty(&self) -> String {
        match self.extract_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed, treating PDF as image-only: {}", e);
                String::new()
            }
        }
    }

    fn classify(&self, text: &str) -> PdfType {
        let text_len = text.chars().filter(|c| !c.is_whitespace()).count();
        let images = self.count_images();

        let pdf_type = if text_len >= self.min_text_length.max(1) {
            PdfType::Text
        } else if images > 0 {
            PdfType::Scanned
        } else {
            PdfType::Empty
        };

        debug!(
            "PDF analysis: {} chars text, {} images -> {:?}",
            text_len, images, pdf_type
        );
        pdf_type
    }

    /// Count image XObjects anywhere in the document.
    fn count_images(&self) -> usize {
        let Some(doc) = self.document.as_ref() else {
            return 0;
        };

        doc.objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|subtype| subtype.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .inspect(|_| trace!("Found image object"))
            .count()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Receipts exported by store apps are often encrypted with an empty password
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted_data
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }
        if self.max_pages > 0 && page_count > self.max_pages {
            return Err(PdfError::TooManyPages(page_count, self.max_pages));
        }

        debug!("Loaded PDF with {} pages", page_count);
        // Document and bytes are replaced together; a rejected load keeps the previous pair
        self.raw_data = raw_data;
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        if self.document.is_none() {
            return PdfType::Empty;
        }
        let text = self.text_or_empty();
        self.classify(&text)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::NotLoaded);
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![0.into(), 0.into(), 226.into(), 600.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert_eq!(extractor.analyze(), PdfType::Empty);
        assert!(matches!(extractor.extract_text(), Err(PdfError::NotLoaded)));
        assert!(matches!(extractor.extract_all(), Err(PdfError::NotLoaded)));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"CONTINENTE 1,29"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_load_counts_pages() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&blank_pdf(2)).unwrap();
        assert_eq!(extractor.page_count(), 2);
    }

    #[test]
    fn test_rejected_reload_keeps_previous_document() {
        let first = blank_pdf(1);
        let mut extractor = PdfExtractor::new().with_max_pages(2);
        extractor.load(&first).unwrap();

        assert!(matches!(
            extractor.load(&blank_pdf(3)),
            Err(PdfError::TooManyPages(3, 2))
        ));
        assert!(matches!(
            extractor.load(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));

        assert_eq!(extractor.page_count(), 1);
        assert_eq!(extractor.raw_data, first);
    }

    #[test]
    fn test_page_limit() {
        let mut extractor = PdfExtractor::new().with_max_pages(2);
        assert!(matches!(
            extractor.load(&blank_pdf(3)),
            Err(PdfError::TooManyPages(3, 2))
        ));

        let mut unlimited = PdfExtractor::new().with_max_pages(0);
        assert!(unlimited.load(&blank_pdf(3)).is_ok());
    }
}
