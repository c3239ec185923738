//! Date extraction for receipts.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor for `DD/MM/YYYY` tokens.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_DMY.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);

            // 31/02/2024 and friends are not dates
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };

            if let Some(full_match) = caps.get(0) {
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Extract the first valid date from receipt text.
pub fn extract_invoice_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_date_dmy() {
        let result = DateExtractor::new().extract("04/03/2024").unwrap();
        assert_eq!(result.value, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(result.source, "04/03/2024");
        assert_eq!(result.position, Some((0, 10)));
    }

    #[test]
    fn test_first_date_wins() {
        let text = "CONTINENTE\n04/03/2024 18:22\nVALIDO ATE 30/04/2024";
        assert_eq!(
            extract_invoice_date(text),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
    }

    #[test]
    fn test_invalid_date_skipped() {
        let text = "REF 31/02/2024 DATA 01.03.2024";
        assert_eq!(
            extract_invoice_date(text),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_invoice_date("TOTAL A PAGAR 23,56"), None);
    }
}
