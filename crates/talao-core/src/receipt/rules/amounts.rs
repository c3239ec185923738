//! Amount parsing and the printed-total extractor.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::TOTAL_DUE;
use super::{ExtractionMatch, FieldExtractor};

/// Printed grand total extractor ("TOTAL A PAGAR 23,56").
pub struct TotalExtractor;

impl TotalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TOTAL_DUE
            .captures_iter(text)
            .filter_map(|caps| {
                let amount = parse_amount(&caps["amount"])?;
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(round_money(amount), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Extract the printed grand total from receipt text.
pub fn extract_total(text: &str) -> Option<Decimal> {
    TotalExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a receipt amount ("1,49", "1.49", "1.234,56", "2.334").
///
/// The last `.` or `,` is the decimal separator; any earlier separators are
/// thousands separators. Returns `None` when the token holds no number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind([',', '.']) {
        Some(pos) => {
            let integer_part: String = cleaned[..pos]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            let fraction_part = &cleaned[pos + 1..];

            match (integer_part.is_empty(), fraction_part.is_empty()) {
                (_, true) => integer_part,
                (true, false) => format!("0.{}", fraction_part),
                (false, false) => format!("{}.{}", integer_part, fraction_part),
            }
        }
        None => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Round a monetary amount to cents.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount Portuguese style ("1 234,56").
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s;
    };

    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(' ');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}
