//! Article name normalization.
//!
//! The same product shows up under slightly different names across
//! receipts ("ATUM POSTA OLEO VEGETAL CNT 85G", "ATUM OLEO 85G"). An ordered
//! list of rules maps such names onto one canonical name; the first
//! matching rule wins.

use std::fmt;
use std::sync::Arc;

use crate::models::config::NameRuleConfig;
use crate::receipt::rules::fold_key;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single `(predicate, canonical name)` rule.
///
/// Predicates receive the folded name: upper-cased, without accents,
/// single-spaced.
#[derive(Clone)]
pub struct NameRule {
    predicate: Predicate,
    canonical: String,
}

impl NameRule {
    /// Create a rule from an arbitrary predicate over the folded name.
    pub fn new<F>(predicate: F, canonical: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            canonical: canonical.into(),
        }
    }

    /// Create a rule that matches when every keyword occurs in the name.
    pub fn contains_all<I, S>(keywords: I, canonical: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| fold_key(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();

        Self::new(
            move |name| !keywords.is_empty() && keywords.iter().all(|k| name.contains(k.as_str())),
            canonical,
        )
    }

    pub fn matches(&self, folded_name: &str) -> bool {
        (self.predicate)(folded_name)
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Debug for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameRule")
            .field("canonical", &self.canonical)
            .finish_non_exhaustive()
    }
}

impl From<&NameRuleConfig> for NameRule {
    fn from(config: &NameRuleConfig) -> Self {
        Self::contains_all(&config.keywords, config.canonical.clone())
    }
}

/// Ordered set of name rules.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    rules: Vec<NameRule>,
}

impl NameNormalizer {
    /// Create a normalizer without rules (names pass through unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(rules: &[NameRuleConfig]) -> Self {
        Self {
            rules: rules.iter().map(NameRule::from).collect(),
        }
    }

    /// Append a rule; it is tried after all existing rules.
    pub fn with_rule(mut self, rule: NameRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: NameRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Canonical name for an article, or the trimmed name itself.
    pub fn normalize(&self, name: &str) -> String {
        let folded = fold_key(name);
        self.rules
            .iter()
            .find(|rule| rule.matches(&folded))
            .map(|rule| rule.canonical().to_string())
            .unwrap_or_else(|| name.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_all_rule() {
        let normalizer = NameNormalizer::new().with_rule(NameRule::contains_all(
            ["atum", "óleo", "85"],
            "ATUM OLEO 85G CONTINENTE",
        ));

        assert_eq!(
            normalizer.normalize("(A)ATUM POSTA ÓLEO VEGETAL CNT 85G"),
            "ATUM OLEO 85G CONTINENTE"
        );
        assert_eq!(
            normalizer.normalize("Atum Posta Oleo 85g"),
            "ATUM OLEO 85G CONTINENTE"
        );
        assert_eq!(normalizer.normalize("ATUM AO NATURAL 120G"), "ATUM AO NATURAL 120G");
    }

    #[test]
    fn test_first_rule_wins() {
        let normalizer = NameNormalizer::new()
            .with_rule(NameRule::contains_all(["LEITE", "MAGRO"], "LEITE MAGRO"))
            .with_rule(NameRule::contains_all(["LEITE"], "LEITE"));

        assert_eq!(normalizer.normalize("LEITE MIMOSA MAGRO 1L"), "LEITE MAGRO");
        assert_eq!(normalizer.normalize("LEITE MIMOSA MEIO GORDO"), "LEITE");
    }

    #[test]
    fn test_custom_predicate() {
        let normalizer = NameNormalizer::new().with_rule(NameRule::new(
            |name| name.starts_with("COCA COLA"),
            "COCA COLA",
        ));

        assert_eq!(normalizer.normalize("Coca Cola Zero 1,5L"), "COCA COLA");
        assert_eq!(normalizer.normalize("  PEPSI 1,5L "), "PEPSI 1,5L");
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let rule = NameRule::contains_all(Vec::<String>::new(), "NOTHING");
        assert!(!rule.matches("ANYTHING"));
    }

    #[test]
    fn test_from_config() {
        let normalizer = NameNormalizer::from_config(&[NameRuleConfig {
            keywords: vec!["PAO".into(), "FORMA".into()],
            canonical: "PAO DE FORMA".into(),
        }]);

        assert_eq!(normalizer.len(), 1);
        assert_eq!(normalizer.normalize("Pão de Forma Integral"), "PAO DE FORMA");
    }
}
