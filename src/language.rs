//! Prompt language selection
//!
//! Picks the language of the instruction preamble from the script of the
//! user's own text. Detection is a fixed priority list of Unicode ranges:
//! the first range with any matching character wins, so mixed-script input
//! resolves to the earliest language in the list (Japanese text containing
//! kanji routes to Chinese).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Languages the assistant can address the model in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Hindi,
    English,
}

/// Detection order with the character class for each script.
const SCRIPT_PATTERNS: [(Language, &str); 5] = [
    (Language::Chinese, r"[\x{4E00}-\x{9FFF}]"),
    (Language::Japanese, r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}]"),
    (Language::Korean, r"[\x{AC00}-\x{D7AF}\x{1100}-\x{11FF}]"),
    (Language::Arabic, r"[\x{0600}-\x{06FF}]"),
    (Language::Hindi, r"[\x{0900}-\x{097F}]"),
];

fn script_matchers() -> &'static [(Language, Regex)] {
    static MATCHERS: OnceLock<Vec<(Language, Regex)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        SCRIPT_PATTERNS
            .iter()
            .map(|(lang, pattern)| {
                (
                    *lang,
                    Regex::new(pattern).expect("script patterns are valid character classes"),
                )
            })
            .collect()
    })
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chinese => "zh",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Arabic => "ar",
            Self::Hindi => "hi",
            Self::English => "en",
        }
    }

    /// Localized "As a medical AI assistant, " prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use healthai::language::Language;
    ///
    /// assert_eq!(Language::English.preamble(), "As a medical AI assistant, ");
    /// ```
    pub fn preamble(&self) -> &'static str {
        match self {
            Self::Chinese => "作为医疗AI助手，",
            Self::Japanese => "医療AIアシスタントとして、",
            Self::Korean => "의료 AI 보조자로서, ",
            Self::Arabic => "كمساعد طبي ذكي، ",
            Self::Hindi => "एक चिकित्सा AI सहायक के रूप में, ",
            Self::English => "As a medical AI assistant, ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Detect the prompt language for a piece of user text
///
/// # Examples
///
/// ```
/// use healthai::language::{detect_language, Language};
///
/// assert_eq!(detect_language("头痛"), Language::Chinese);
/// assert_eq!(detect_language("headache"), Language::English);
/// ```
pub fn detect_language(text: &str) -> Language {
    script_matchers()
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(lang, _)| *lang)
        .unwrap_or(Language::English)
}

/// Prefix `prompt` with the preamble for the language of `input_text`
pub fn localize_prompt(prompt: &str, input_text: &str) -> String {
    let lang = detect_language(input_text);
    tracing::debug!(language = %lang, "Selected prompt language");
    format!("{}{}", lang.preamble(), prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_ideographs_route_to_chinese() {
        assert_eq!(detect_language("我头痛发烧"), Language::Chinese);
        assert!(localize_prompt("Explain: 头痛", "头痛").starts_with("作为医疗AI助手，"));
    }

    #[test]
    fn test_kana_routes_to_japanese() {
        assert_eq!(detect_language("ずつう"), Language::Japanese);
        assert_eq!(detect_language("カタカナ"), Language::Japanese);
    }

    #[test]
    fn test_kanji_with_kana_prefers_chinese() {
        assert_eq!(detect_language("頭が痛い"), Language::Chinese);
    }

    #[test]
    fn test_hangul_routes_to_korean() {
        assert_eq!(detect_language("두통이 있어요"), Language::Korean);
    }

    #[test]
    fn test_arabic_and_hindi() {
        assert_eq!(detect_language("صداع"), Language::Arabic);
        assert_eq!(detect_language("सिरदर्द"), Language::Hindi);
    }

    #[test]
    fn test_arabic_beats_hindi_in_mixed_input() {
        assert_eq!(detect_language("सिरदर्द صداع"), Language::Arabic);
    }

    #[test]
    fn test_latin_and_empty_default_to_english() {
        assert_eq!(detect_language("fever and chills"), Language::English);
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("café à la mode"), Language::English);
    }

    #[test]
    fn test_localize_prompt_english() {
        assert_eq!(
            localize_prompt("Explain: tachycardia", "tachycardia"),
            "As a medical AI assistant, Explain: tachycardia"
        );
    }

    #[test]
    fn test_codes() {
        let codes: Vec<&str> = [
            Language::Chinese,
            Language::Japanese,
            Language::Korean,
            Language::Arabic,
            Language::Hindi,
            Language::English,
        ]
        .iter()
        .map(|l| l.code())
        .collect();
        assert_eq!(codes, vec!["zh", "ja", "ko", "ar", "hi", "en"]);
    }
}
