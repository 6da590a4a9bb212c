/*!
 * Placeholder validation for translated masked text.
 *
 * Translators occasionally drop, duplicate or invent `[Category_id]`
 * placeholders. Comparing the placeholder multisets of the masked source
 * and the raw translation shows which glossary terms will be missing (or
 * unexpected) after unmasking.
 */

use log::debug;
use std::collections::BTreeMap;

use crate::masking::find_placeholders;

/// Placeholder validation result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderValidationResult {
    /// Placeholders in the masked source, in order
    pub expected: Vec<String>,
    /// Placeholders in the translation, in order
    pub found: Vec<String>,
    /// Source placeholders absent from the translation (one per lost occurrence)
    pub missing: Vec<String>,
    /// Translation placeholders with no counterpart in the source
    pub unexpected: Vec<String>,
}

impl PlaceholderValidationResult {
    /// Check if validation passed
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Human readable summary of the problems
    pub fn describe(&self) -> Option<String> {
        if self.passed() {
            return None;
        }
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing {}", self.missing.join(" ")));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("unexpected {}", self.unexpected.join(" ")));
        }
        Some(parts.join("; "))
    }
}

/// Placeholder validator for translated masked text
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    /// Compare the placeholders of `masked_source` and `translated`
    pub fn validate(masked_source: &str, translated: &str) -> PlaceholderValidationResult {
        let expected: Vec<String> = find_placeholders(masked_source).into_iter().map(String::from).collect();
        let found: Vec<String> = find_placeholders(translated).into_iter().map(String::from).collect();

        let mut balance: BTreeMap<&str, i64> = BTreeMap::new();
        for token in &expected {
            *balance.entry(token.as_str()).or_insert(0) += 1;
        }
        for token in &found {
            *balance.entry(token.as_str()).or_insert(0) -= 1;
        }

        let mut missing = Vec::new();
        let mut unexpected = Vec::new();
        for (token, count) in balance {
            if count > 0 {
                missing.extend(std::iter::repeat_n(token.to_string(), count as usize));
            } else if count < 0 {
                unexpected.extend(std::iter::repeat_n(token.to_string(), (-count) as usize));
            }
        }

        debug!(
            "Placeholder validation: expected={}, found={}, missing={}, unexpected={}",
            expected.len(),
            found.len(),
            missing.len(),
            unexpected.len()
        );

        PlaceholderValidationResult {
            expected,
            found,
            missing,
            unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_withAllPlaceholdersKept_shouldPass() {
        let result = PlaceholderValidator::validate(
            "Go to [Location_a1] with [Npc_b2].",
            "Va à [Location_a1] avec [Npc_b2].",
        );
        assert!(result.passed());
        assert_eq!(result.describe(), None);
    }

    #[test]
    fn test_validate_withReorderedPlaceholders_shouldPass() {
        let result = PlaceholderValidator::validate("[Npc_b2] of [Location_a1]", "[Location_a1]'s [Npc_b2]");
        assert!(result.passed());
    }

    #[test]
    fn test_validate_withDroppedPlaceholder_shouldReportMissing() {
        let result = PlaceholderValidator::validate(
            "[Location_a1] and [Location_a1]",
            "[Location_a1] et Whiterun",
        );
        assert!(!result.passed());
        assert_eq!(result.missing, vec!["[Location_a1]".to_string()]);
        assert!(result.unexpected.is_empty());
    }

    #[test]
    fn test_validate_withInventedPlaceholder_shouldReportUnexpected() {
        let result = PlaceholderValidator::validate("Hello", "Bonjour [Npc_zz1]");
        assert_eq!(result.unexpected, vec!["[Npc_zz1]".to_string()]);
        assert_eq!(result.describe().unwrap(), "unexpected [Npc_zz1]");
    }
}
