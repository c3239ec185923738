//! Line pre-processing for extracted PDF text.
//!
//! PDF text extraction leaves carriage returns, non-breaking spaces,
//! zero-width characters and decomposed accents behind. Everything here
//! turns that into plain, trimmed, NFC-normalized lines.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize line endings and whitespace, keeping the line structure.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());

    for c in text.nfc() {
        match c {
            '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => {
                out.push('\n')
            }
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            c if c.is_whitespace() => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// Split raw receipt text into non-empty lines with single inner spaces.
pub fn preprocess(text: &str) -> Vec<String> {
    normalize_text(text)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Comparison key: upper-cased, accents stripped, single spaces.
///
/// `"Pão de Forma"` and `"PAO  DE FORMA"` fold to the same key.
pub fn fold_key(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preprocess_line_endings() {
        let text = "LINHA UM\r\nLINHA DOIS\rLINHA TRES\n\n   \nLINHA QUATRO";
        assert_eq!(
            preprocess(text),
            vec!["LINHA UM", "LINHA DOIS", "LINHA TRES", "LINHA QUATRO"]
        );
    }

    #[test]
    fn test_preprocess_whitespace_artifacts() {
        let text = "  CALVE\u{00a0}MAIONESE\t\tTD 240G \u{200b}1,49  \u{000c}FIM";
        assert_eq!(preprocess(text), vec!["CALVE MAIONESE TD 240G 1,49", "FIM"]);
    }

    #[test]
    fn test_preprocess_composes_accents() {
        // "PÃO" with a combining tilde
        let text = "PA\u{0303}O DE FORMA 1,29";
        assert_eq!(preprocess(text), vec!["P\u{00c3}O DE FORMA 1,29"]);
    }

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("Pão de  Forma"), "PAO DE FORMA");
        assert_eq!(fold_key("Cartão"), "CARTAO");
        assert_eq!(fold_key("  atum óleo 85g "), "ATUM OLEO 85G");
    }
}
