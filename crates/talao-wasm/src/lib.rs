//! WASM bindings for supermarket receipt extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Amounts cross the boundary as decimal strings ("7.44"); dates as ISO
//! strings ("2024-03-04").

use serde::Serialize;
use wasm_bindgen::prelude::*;

use talao_core::models::config::ParserConfig;
use talao_core::receipt::rules;
use talao_core::{
    aggregate, summarize, AggregationOptions, ArticleSort, ExtractionError, FractionalQuantityPolicy,
    LineItem, ParsedReceipt, ReceiptParser, RuleReceiptParser,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

/// Serialize maps as plain objects rather than JS `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn text_argument(text: &JsValue) -> Result<String, JsValue> {
    text.as_string().ok_or_else(|| {
        js_error(ExtractionError::InvalidInput(
            "expected a string of extracted receipt text".to_string(),
        ))
    })
}

/// Extract line items, invoice date and total from receipt text.
///
/// Throws when `text` is not a string.
#[wasm_bindgen]
pub fn extract_receipt(text: JsValue) -> Result<JsValue, JsValue> {
    let text = text_argument(&text)?;
    let result = RuleReceiptParser::new().parse(&text).map_err(js_error)?;
    to_js(&result.receipt)
}

/// Parse a receipt amount ("1,49", "1.234,56").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    rules::parse_amount(amount).and_then(|d| d.to_string().parse().ok())
}

/// Aggregate line items per article, sorted by quantity.
///
/// Items sold by weight are skipped unless `include_fractional` is set.
#[wasm_bindgen]
pub fn aggregate_items(items: JsValue, include_fractional: bool) -> Result<JsValue, JsValue> {
    let items: Vec<LineItem> = serde_wasm_bindgen::from_value(items).map_err(js_error)?;

    let policy = if include_fractional {
        FractionalQuantityPolicy::Include
    } else {
        FractionalQuantityPolicy::Exclude
    };
    let options = AggregationOptions::new().with_fractional(policy);

    to_js(&summarize(&aggregate(&items, &options), ArticleSort::Quantity))
}

/// Sum printed totals per month (`{"2024-03": "33.56"}`).
#[wasm_bindgen]
pub fn monthly_totals(receipts: JsValue) -> Result<JsValue, JsValue> {
    let receipts: Vec<ParsedReceipt> =
        serde_wasm_bindgen::from_value(receipts).map_err(js_error)?;
    to_js(&talao_core::monthly_totals(&receipts))
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    parser: RuleReceiptParser,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a receipt extractor.
    ///
    /// `config` is an optional parser configuration object, e.g.
    /// `{ prefer_printed_total: false, currency: "EUR" }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReceiptExtractor, JsValue> {
        let config: ParserConfig = if config.is_undefined() || config.is_null() {
            ParserConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };

        Ok(Self {
            parser: RuleReceiptParser::from_config(&config),
        })
    }

    /// Extract a receipt from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: JsValue) -> Result<JsValue, JsValue> {
        let text = text_argument(&text)?;
        let result = self.parser.parse(&text).map_err(js_error)?;
        to_js(&result.receipt)
    }

    /// Get extraction result with scanned line count and warnings.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: JsValue) -> Result<JsValue, JsValue> {
        let text = text_argument(&text)?;
        let result = self.parser.parse(&text).map_err(js_error)?;
        to_js(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        let amount = parse_amount("1.234,56");
        assert!(amount.is_some());
        assert!((amount.unwrap() - 1234.56).abs() < 0.001);
        assert_eq!(parse_amount("Y,Z"), None);
    }

    #[wasm_bindgen_test]
    fn test_extract_receipt() {
        let value = extract_receipt(JsValue::from_str("04/03/2024\nPAO 1,29\nTOTAL A PAGAR 1,29"))
            .unwrap();
        let receipt: ParsedReceipt = serde_wasm_bindgen::from_value(value).unwrap();

        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].name, "PAO");
        assert_eq!(receipt.invoice_date_label(), "04/03/2024");
    }

    #[wasm_bindgen_test]
    fn test_extract_receipt_rejects_non_string() {
        assert!(extract_receipt(JsValue::from_f64(42.0)).is_err());
        assert!(extract_receipt(JsValue::NULL).is_err());
    }

    #[wasm_bindgen_test]
    fn test_extractor_with_config() {
        let extractor = ReceiptExtractor::new(JsValue::UNDEFINED).unwrap();
        assert!(extractor.extract(JsValue::from_str("PAO 1,29")).is_ok());
        assert!(extractor.extract(JsValue::TRUE).is_err());
    }
}
