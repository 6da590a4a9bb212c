//! Language utilities for ISO language code handling
//!
//! Config files may name languages with ISO 639-1 (`fr`), ISO 639-2/T (`fra`)
//! or ISO 639-2/B (`fre`) codes. Prompts need the English name and the
//! translation memory needs one canonical code per language.

use anyhow::{anyhow, Result};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn lookup(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == normalized_code)
                .map(|(_, t)| *t)
                .unwrap_or(normalized_code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 if one exists, else ISO 639-3
pub fn normalize_code(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validateLanguageCode_withKnownCodes_shouldSucceed() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("fra").is_ok());
        assert!(validate_language_code("ger").is_ok());
        assert!(validate_language_code(" FR ").is_ok());
    }

    #[test]
    fn test_validateLanguageCode_withUnknownCodes_shouldFail() {
        assert!(validate_language_code("xx").is_err());
        assert!(validate_language_code("french").is_err());
        assert!(validate_language_code("").is_err());
    }

    #[test]
    fn test_normalizeCode_shouldPreferTwoLetterCodes() {
        assert_eq!(normalize_code("fre").unwrap(), "fr");
        assert_eq!(normalize_code("deu").unwrap(), "de");
        assert_eq!(normalize_code("EN").unwrap(), "en");
    }

    #[test]
    fn test_languageCodesMatch_acrossCodeFamilies() {
        assert!(language_codes_match("fr", "fre"));
        assert!(language_codes_match("fra", "fr"));
        assert!(!language_codes_match("fr", "de"));
        assert!(!language_codes_match("fr", "zz"));
    }

    #[test]
    fn test_getLanguageName_shouldReturnEnglishName() {
        assert_eq!(get_language_name("fr").unwrap(), "French");
        assert_eq!(get_language_name("ger").unwrap(), "German");
        assert!(get_language_name("xx").is_err());
    }
}
