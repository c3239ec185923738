//! Receipt data models.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A parsed supermarket receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    /// Date printed on the receipt.
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,

    /// Printed grand total ("total a pagar").
    #[serde(default)]
    pub total: Option<Decimal>,

    /// Currency code (default: EUR).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Line items in the order they appear on the receipt.
    #[serde(default)]
    pub items: Vec<LineItem>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// One purchased article on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Article description, without the category marker.
    pub name: String,

    /// Quantity (fractional for goods sold by weight).
    pub quantity: Decimal,

    /// Line total.
    pub price: Decimal,

    /// Unit price, when the receipt prints one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Category marker code, e.g. `C` for `(C)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LineItem {
    /// Create an item with an implicit quantity of one.
    pub fn single(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity: Decimal::ONE,
            price,
            unit_price: None,
            category: None,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Whether the quantity has a fractional part (weighed goods).
    pub fn is_fractional(&self) -> bool {
        !self.quantity.fract().is_zero()
    }
}

impl ParsedReceipt {
    /// Create an empty receipt in the given currency.
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            invoice_date: None,
            total: None,
            currency: currency.into(),
            items: Vec::new(),
        }
    }

    /// Invoice date as printed (`DD/MM/YYYY`), or an empty string.
    pub fn invoice_date_label(&self) -> String {
        self.invoice_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    /// Month key (`YYYY-MM`) used for monthly statistics.
    pub fn month_key(&self) -> Option<String> {
        self.invoice_date
            .map(|d| format!("{:04}-{:02}", d.year(), d.month()))
    }

    /// Printed total, or zero when none was found.
    pub fn total_or_zero(&self) -> Decimal {
        self.total.unwrap_or(Decimal::ZERO)
    }

    /// Sum of all line item prices, or `None` if it overflows.
    pub fn items_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.price))
    }

    /// Check the receipt for inconsistencies and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        if self.invoice_date.is_none() {
            issues.push("Missing invoice date".to_string());
        }

        match self.total {
            None => issues.push("Missing printed total".to_string()),
            Some(total) if !self.items.is_empty() => match self.items_total() {
                None => issues.push("Line item total overflows".to_string()),
                Some(calculated) => {
                    let differs = calculated
                        .checked_sub(total)
                        .is_none_or(|diff| diff.abs() > Decimal::new(1, 2));
                    if differs {
                        issues.push(format!(
                            "Line item total ({}) differs from printed total ({})",
                            calculated, total
                        ));
                    }
                }
            },
            Some(_) => {}
        }

        issues
    }
}

impl Default for ParsedReceipt {
    fn default() -> Self {
        Self::new(default_currency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_invoice_date_label() {
        let mut receipt = ParsedReceipt::default();
        assert_eq!(receipt.invoice_date_label(), "");
        assert_eq!(receipt.month_key(), None);

        receipt.invoice_date = NaiveDate::from_ymd_opt(2024, 3, 4);
        assert_eq!(receipt.invoice_date_label(), "04/03/2024");
        assert_eq!(receipt.month_key().as_deref(), Some("2024-03"));
    }

    #[test]
    fn test_fractional_quantity() {
        let mut item = LineItem::single("BANANA", dec("1.20"));
        assert!(!item.is_fractional());

        item.quantity = dec("2.334");
        assert!(item.is_fractional());

        item.quantity = dec("8.000");
        assert!(!item.is_fractional());
    }

    #[test]
    fn test_validate_total_mismatch() {
        let mut receipt = ParsedReceipt::default();
        receipt.invoice_date = NaiveDate::from_ymd_opt(2024, 3, 4);
        receipt.items.push(LineItem::single("LEITE", dec("0.89")));
        receipt.items.push(LineItem::single("PAO", dec("1.10")));

        receipt.total = Some(dec("1.99"));
        assert!(receipt.validate().is_empty());

        receipt.total = Some(dec("5.00"));
        let issues = receipt.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("differs"));
    }

    #[test]
    fn test_items_total_overflow() {
        let huge = dec("70000000000000000000000000000");
        let mut receipt = ParsedReceipt::default();
        receipt.items.push(LineItem::single("ARTIGO", huge));
        assert_eq!(receipt.items_total(), Some(huge));

        receipt.items.push(LineItem::single("ARTIGO", huge));
        receipt.total = Some(dec("1.00"));
        assert_eq!(receipt.items_total(), None);
        assert!(receipt.validate().iter().any(|w| w == "Line item total overflows"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let receipt: ParsedReceipt = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(receipt.currency, "EUR");
        assert_eq!(receipt.total, None);
        assert_eq!(receipt.total_or_zero(), Decimal::ZERO);
    }
}
