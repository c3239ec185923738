//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TalaoError};
use crate::stats::{ArticleSort, FractionalQuantityPolicy};

/// Main configuration for talao.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TalaoConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Line item parser configuration.
    pub parser: ParserConfig,

    /// Statistics configuration.
    pub aggregation: AggregationConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            min_text_length: 20,
        }
    }
}

/// Line item parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Leading words that mark summary lines (totals, payment, change).
    /// Compared upper-cased and without accents.
    pub summary_keywords: Vec<String>,

    /// Use the printed line total of a two-line item instead of
    /// quantity times unit price.
    pub prefer_printed_total: bool,

    /// Currency code assigned to parsed receipts.
    pub currency: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            summary_keywords: [
                "TOTAL",
                "SUBTOTAL",
                "SUB-TOTAL",
                "TROCO",
                "IVA",
                "MULTIBANCO",
                "DINHEIRO",
                "CARTAO",
                "PAGAMENTO",
                "SALDO",
                "DESCONTO",
                "POUPANCA",
                "VALOR A PAGAR",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            prefer_printed_total: true,
            currency: "EUR".to_string(),
        }
    }
}

/// Statistics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// What to do with weighed goods (fractional quantities).
    pub fractional_quantities: FractionalQuantityPolicy,

    /// Default ordering of article reports.
    pub sort: ArticleSort,

    /// Ordered name rules collapsing near-duplicate article names.
    pub name_rules: Vec<NameRuleConfig>,
}

/// A keyword rule: when every keyword occurs in an article name,
/// the article is reported under `canonical`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRuleConfig {
    pub keywords: Vec<String>,
    pub canonical: String,
}

impl TalaoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TalaoError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| TalaoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
