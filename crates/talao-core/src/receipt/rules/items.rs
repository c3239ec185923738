//! Line item matching.
//!
//! Receipts print an article either on one line (`name price`) or on two
//! (`name` followed by `quantity X unit-price total`). The matcher walks
//! the pre-processed lines once, with one line of lookahead.

use rust_decimal::Decimal;
use tracing::trace;

use super::amounts::{parse_amount, round_money};
use super::lines::fold_key;
use super::patterns::{DESCRIPTION_LINE, QUANTITY_DETAIL, SINGLE_LINE_ITEM};
use crate::models::config::ParserConfig;
use crate::models::receipt::LineItem;

/// Rule-based line item matcher.
#[derive(Debug, Clone)]
pub struct LineItemMatcher {
    /// Folded summary keywords.
    summary_keywords: Vec<String>,
    /// Prefer the printed line total over quantity times unit price.
    prefer_printed_total: bool,
}

impl LineItemMatcher {
    /// Create a matcher with default settings.
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            summary_keywords: config
                .summary_keywords
                .iter()
                .map(|k| fold_key(k))
                .filter(|k| !k.is_empty())
                .collect(),
            prefer_printed_total: config.prefer_printed_total,
        }
    }

    /// Replace the summary keyword list.
    pub fn with_summary_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.summary_keywords = keywords
            .into_iter()
            .map(|k| fold_key(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    /// Set printed-total preference for two-line items.
    pub fn with_printed_total_preference(mut self, prefer: bool) -> Self {
        self.prefer_printed_total = prefer;
        self
    }

    /// Scan pre-processed lines and return items in source order.
    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> Vec<LineItem> {
        let mut items = Vec::new();
        let mut pos = 0;

        while pos < lines.len() {
            let line = lines[pos].as_ref();

            if let Some(item) = self.match_single(line) {
                trace!("line {}: single-line item {:?}", pos, item.name);
                items.push(item);
                pos += 1;
                continue;
            }

            if let Some(detail) = lines.get(pos + 1) {
                if let Some(item) = self.match_two_line(line, detail.as_ref()) {
                    trace!("lines {}-{}: two-line item {:?}", pos, pos + 1, item.name);
                    items.push(item);
                    pos += 2;
                    continue;
                }
            }

            pos += 1;
        }

        items
    }

    /// Match `[marker]name price` on a single line.
    pub fn match_single(&self, line: &str) -> Option<LineItem> {
        let caps = SINGLE_LINE_ITEM.captures(line)?;
        let name = caps["name"].trim();

        if self.is_summary_line(name) {
            return None;
        }

        let price = round_money(parse_amount(&caps["price"])?);
        let category = caps.name("category").map(|m| m.as_str().to_string());

        Some(LineItem::single(name, price).with_category(category))
    }

    /// Match a bare description followed by a `quantity X unit total` line.
    pub fn match_two_line(&self, description: &str, detail: &str) -> Option<LineItem> {
        let detail_caps = QUANTITY_DETAIL.captures(detail)?;
        let desc_caps = DESCRIPTION_LINE.captures(description)?;

        let name = desc_caps["name"].trim();
        if name.is_empty() || self.is_summary_line(name) {
            return None;
        }

        let quantity = parse_amount(&detail_caps["quantity"])?;
        if quantity <= Decimal::ZERO {
            return None;
        }
        let unit_price = parse_amount(&detail_caps["unit"])?;

        let printed = match detail_caps.name("total") {
            Some(m) => Some(parse_amount(m.as_str())?),
            None => None,
        };

        let price = match printed {
            Some(total) if self.prefer_printed_total && !total.is_zero() => round_money(total),
            _ => round_money(quantity.checked_mul(unit_price)?),
        };

        Some(LineItem {
            name: name.to_string(),
            quantity: quantity.normalize(),
            price,
            unit_price: Some(unit_price),
            category: desc_caps.name("category").map(|m| m.as_str().to_string()),
        })
    }

    fn is_summary_line(&self, name: &str) -> bool {
        let key = fold_key(name);
        self.summary_keywords.iter().any(|keyword| {
            key.strip_prefix(keyword.as_str())
                .is_some_and(|rest| rest.is_empty() || !rest.starts_with(char::is_alphanumeric))
        })
    }
}

impl Default for LineItemMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_single_line_item() {
        let item = LineItemMatcher::new()
            .match_single("(C)CALVE MAIONESE TD 240G 1,49")
            .unwrap();

        assert_eq!(item.name, "CALVE MAIONESE TD 240G");
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.price, dec("1.49"));
        assert_eq!(item.category.as_deref(), Some("C"));
        assert_eq!(item.unit_price, None);
    }

    #[test]
    fn test_single_line_dot_separator() {
        let item = LineItemMatcher::new().match_single("LEITE UHT 1L 0.89").unwrap();
        assert_eq!(item.name, "LEITE UHT 1L");
        assert_eq!(item.price, dec("0.89"));
        assert_eq!(item.category, None);
    }

    #[test]
    fn test_two_line_item_prefers_printed_total() {
        let item = LineItemMatcher::new()
            .match_two_line("(A)ATUM POSTA OLEO VEGETAL CNT 85G", "8 X 0,93 7,44")
            .unwrap();

        assert_eq!(item.name, "ATUM POSTA OLEO VEGETAL CNT 85G");
        assert_eq!(item.quantity, dec("8"));
        assert_eq!(item.unit_price, Some(dec("0.93")));
        assert_eq!(item.price, dec("7.44"));
        assert_eq!(item.category.as_deref(), Some("A"));
    }

    #[test]
    fn test_two_line_item_printed_total_differs_from_product() {
        // 3 x 0.33 = 0.99, receipt rounds the line to 1.00
        let item = LineItemMatcher::new()
            .match_two_line("PASTILHAS", "3 X 0,33 1,00")
            .unwrap();
        assert_eq!(item.price, dec("1.00"));

        let computed = LineItemMatcher::new()
            .with_printed_total_preference(false)
            .match_two_line("PASTILHAS", "3 X 0,33 1,00")
            .unwrap();
        assert_eq!(computed.price, dec("0.99"));
    }

    #[test]
    fn test_two_line_item_falls_back_to_product() {
        let matcher = LineItemMatcher::new();

        let missing = matcher.match_two_line("IOGURTE", "4 X 0,45").unwrap();
        assert_eq!(missing.price, dec("1.80"));

        let zero = matcher.match_two_line("IOGURTE", "4 X 0,45 0,00").unwrap();
        assert_eq!(zero.price, dec("1.80"));
    }

    #[test]
    fn test_two_line_weighed_item() {
        let item = LineItemMatcher::new()
            .match_two_line("BANANA IMPORTADA", "2,334 X 1,29 3,01")
            .unwrap();
        assert_eq!(item.quantity, dec("2.334"));
        assert!(item.is_fractional());
        assert_eq!(item.price, dec("3.01"));
    }

    #[test]
    fn test_scan_skips_detail_line() {
        let lines = [
            "(A)ATUM POSTA OLEO VEGETAL CNT 85G",
            "8 X 0,93 7,44",
            "(C)CALVE MAIONESE TD 240G 1,49",
        ];
        let items = LineItemMatcher::new().scan(&lines);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "ATUM POSTA OLEO VEGETAL CNT 85G");
        assert_eq!(items[1].name, "CALVE MAIONESE TD 240G");
    }

    #[test]
    fn test_scan_single_line_not_consumed_as_description() {
        // A complete item must not be merged with a detail line below it
        let lines = ["AGUA 1,5L 0,39", "2 X 0,50 1,00"];
        let items = LineItemMatcher::new().scan(&lines);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "AGUA 1,5L");
        assert_eq!(items[0].price, dec("0.39"));
    }

    #[test]
    fn test_scan_malformed_line_continues() {
        let lines = ["PRODUTO X Y,Z", "PAO DE FORMA 1,29"];
        let items = LineItemMatcher::new().scan(&lines);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "PAO DE FORMA");
    }

    #[test]
    fn test_summary_lines_are_not_items() {
        let matcher = LineItemMatcher::new();
        assert!(matcher.match_single("TOTAL A PAGAR 23,56").is_none());
        assert!(matcher.match_single("SUBTOTAL 23,56").is_none());
        assert!(matcher.match_single("Cartão 23,56").is_none());
        assert!(matcher.match_single("TROCO 0,00").is_none());
        // Keyword must be a whole leading word
        assert!(matcher.match_single("TOTALMENTE NATURAL 2,10").is_some());
    }

    #[test]
    fn test_custom_summary_keywords() {
        let matcher = LineItemMatcher::new().with_summary_keywords(["SACO"]);
        assert!(matcher.match_single("SACO PLASTICO 0,10").is_none());
        assert!(matcher.match_single("TOTAL 9,99").is_some());
    }
}
