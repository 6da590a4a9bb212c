/*!
 * Placeholder grammar and unmasking.
 *
 * Placeholders have the fixed form `[Category_id]` where the category is
 * `[A-Za-z]+` and the id is `[a-z0-9]+`. Any bracketed text matching this
 * grammar is treated as a placeholder during unmask, including text that
 * was never produced by masking; unknown tokens are left as they are.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::glossary::GlossaryTerm;

/// Regex for matching placeholder tokens
pub static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Za-z]+_[a-z0-9]+\]").expect("Invalid placeholder regex"));

/// Format the placeholder token for a category and id
pub fn placeholder_token(category: &str, id: &str) -> String {
    format!("[{}_{}]", category, id)
}

/// All placeholder tokens in `text`, left to right
pub fn find_placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Reverse mapping from placeholder token to the original term
#[derive(Debug, Clone, Default)]
pub struct PlaceholderCache {
    tokens: HashMap<String, String>,
}

impl PlaceholderCache {
    /// Build the cache from the terms a matcher was built with
    pub fn from_terms(terms: &[GlossaryTerm]) -> Self {
        let mut tokens = HashMap::with_capacity(terms.len());
        for term in terms {
            tokens
                .entry(placeholder_token(&term.category, &term.id))
                .or_insert_with(|| term.term.clone());
        }
        Self { tokens }
    }

    /// Replace every known placeholder in `text` with its term.
    ///
    /// Unknown placeholders are kept verbatim.
    pub fn unmask(&self, text: &str) -> String {
        if text.is_empty() || self.tokens.is_empty() {
            return text.to_string();
        }

        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                match self.tokens.get(token) {
                    Some(term) => term.clone(),
                    None => {
                        debug!("Unknown placeholder {} left in place", token);
                        token.to_string()
                    }
                }
            })
            .into_owned()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
