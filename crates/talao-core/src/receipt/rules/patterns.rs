//! Common regex patterns for supermarket receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Article and price on one line: "(C)CALVE MAIONESE TD 240G 1,49"
    pub static ref SINGLE_LINE_ITEM: Regex = Regex::new(
        r"^(?:[(\[](?P<category>[A-Za-z0-9]{1,3})[)\]]\s*)?(?P<name>\p{L}.*?)\s+(?P<price>\d{1,3}(?:[.,]\d{3})+[.,]\d{2}|\d+[.,]\d{2})(?:\s*(?:€|EUR))?$"
    ).unwrap();

    // Bare article description, completed by a detail line below it
    pub static ref DESCRIPTION_LINE: Regex = Regex::new(
        r"^(?:[(\[](?P<category>[A-Za-z0-9]{1,3})[)\]]\s*)?(?P<name>\p{L}.*)$"
    ).unwrap();

    // Quantity detail: "8 X 0,93 7,44", "2,334 x 1,29 3,01", "3 X 0,50"
    pub static ref QUANTITY_DETAIL: Regex = Regex::new(
        r"^(?P<quantity>\d+(?:[.,]\d+)?)\s*[xX×]\s*(?P<unit>\d+(?:[.,]\d+)*)(?:\s+(?P<total>\d+(?:[.,]\d+)*))?(?:\s*(?:€|EUR))?$"
    ).unwrap();

    // Receipt dates: DD/MM/YYYY (also DD.MM.YYYY and DD-MM-YYYY)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b"
    ).unwrap();

    // Grand total following a "total to pay" label
    pub static ref TOTAL_DUE: Regex = Regex::new(
        r"(?i)\b(?:total\s+a\s+pagar|valor\s+a\s+pagar|total\s+to\s+pay|amount\s+due)\b(?:\s*\(?(?:eur|€)\)?)?[\s:]*€?\s*(?P<amount>\d{1,3}(?:[.\u{00a0} ]\d{3})+[.,]\d{2}|\d+[.,]\d{2})"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_captures() {
        let caps = SINGLE_LINE_ITEM
            .captures("(C)CALVE MAIONESE TD 240G 1,49")
            .unwrap();
        assert_eq!(&caps["category"], "C");
        assert_eq!(&caps["name"], "CALVE MAIONESE TD 240G");
        assert_eq!(&caps["price"], "1,49");

        let caps = SINGLE_LINE_ITEM.captures("TELEVISOR 55 1.234,56").unwrap();
        assert_eq!(&caps["name"], "TELEVISOR 55");
        assert_eq!(&caps["price"], "1.234,56");
    }

    #[test]
    fn test_single_line_rejects_detail_and_text() {
        assert!(!SINGLE_LINE_ITEM.is_match("8 X 0,93 7,44"));
        assert!(!SINGLE_LINE_ITEM.is_match("PRODUTO X Y,Z"));
        assert!(!SINGLE_LINE_ITEM.is_match("(A)ATUM POSTA OLEO VEGETAL CNT 85G"));
    }

    #[test]
    fn test_quantity_detail_captures() {
        let caps = QUANTITY_DETAIL.captures("8 X 0,93 7,44").unwrap();
        assert_eq!(&caps["quantity"], "8");
        assert_eq!(&caps["unit"], "0,93");
        assert_eq!(&caps["total"], "7,44");

        let caps = QUANTITY_DETAIL.captures("3 x 0,50").unwrap();
        assert!(caps.name("total").is_none());
    }

    #[test]
    fn test_total_due_variants() {
        for text in [
            "TOTAL A PAGAR 23,56",
            "Total a pagar: 23,56",
            "TOTAL A PAGAR € 23,56",
            "TOTAL A PAGAR\n23,56",
        ] {
            let caps = TOTAL_DUE.captures(text).unwrap();
            assert_eq!(&caps["amount"], "23,56", "{text}");
        }
        assert!(!TOTAL_DUE.is_match("SUBTOTAL 23,56"));
    }
}
