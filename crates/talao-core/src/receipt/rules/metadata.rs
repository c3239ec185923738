//! Invoice date and printed total, extracted opportunistically.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::amounts::TotalExtractor;
use super::dates::DateExtractor;
use super::{ExtractionMatch, FieldExtractor};

/// Receipt-level fields found in the raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceMetadata {
    /// First valid date on the receipt.
    pub invoice_date: Option<ExtractionMatch<NaiveDate>>,
    /// First amount after a "total to pay" label.
    pub total: Option<ExtractionMatch<Decimal>>,
}

impl InvoiceMetadata {
    pub fn date(&self) -> Option<NaiveDate> {
        self.invoice_date.as_ref().map(|m| m.value)
    }

    pub fn total(&self) -> Option<Decimal> {
        self.total.as_ref().map(|m| m.value)
    }
}

/// Extract date and total from receipt text. Missing fields stay `None`.
pub fn extract_metadata(text: &str) -> InvoiceMetadata {
    InvoiceMetadata {
        invoice_date: DateExtractor::new().extract(text),
        total: TotalExtractor::new().extract(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_extract_metadata() {
        let text = "CONTINENTE MODELO\nFATURA SIMPLIFICADA\n04/03/2024 18:02\n\
                    (C)CALVE MAIONESE TD 240G 1,49\nTOTAL A PAGAR 23,56\nMULTIBANCO 23,56";

        let metadata = extract_metadata(text);

        assert_eq!(metadata.date(), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(metadata.total(), Some(Decimal::from_str("23.56").unwrap()));
        assert_eq!(metadata.invoice_date.unwrap().source, "04/03/2024");
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let metadata = extract_metadata("nothing useful");
        assert_eq!(metadata, InvoiceMetadata::default());
    }
}
