/*!
 * Longest-match glossary term matcher.
 *
 * All terms are compiled into one case-insensitive alternation, longest term
 * first, wrapped in word boundaries. The regex engine uses leftmost-first
 * semantics for alternations, so at any position the longest term that
 * forms a whole word wins ("Skyrim Hold" before "Skyrim").
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashMap;

use super::placeholder::placeholder_token;
use crate::glossary::GlossaryTerm;

/// Compiled size limit for the alternation; large glossaries exceed the default
const PATTERN_SIZE_LIMIT: usize = 256 * (1 << 20);

#[derive(Debug, Clone)]
struct TermRef {
    id: String,
    category: String,
}

/// Compiled term matcher. Read-only once built.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    /// None when the glossary has no usable terms
    pattern: Option<Regex>,
    /// Lower-cased term -> (id, category)
    lookup: HashMap<String, TermRef>,
}

impl TermMatcher {
    /// Matcher with no terms
    pub fn empty() -> Self {
        Self {
            pattern: None,
            lookup: HashMap::new(),
        }
    }

    /// Build a matcher from glossary terms.
    ///
    /// Blank terms are skipped; for terms that repeat case-insensitively the
    /// first occurrence wins.
    pub fn build(terms: &[GlossaryTerm]) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(terms.len());
        let mut alternatives: Vec<&str> = Vec::with_capacity(terms.len());

        for term in terms {
            if term.term.trim().is_empty() {
                continue;
            }
            let key = term.term.to_lowercase();
            if lookup.contains_key(&key) {
                continue;
            }
            lookup.insert(
                key,
                TermRef {
                    id: term.id.clone(),
                    category: term.category.clone(),
                },
            );
            alternatives.push(term.term.as_str());
        }

        if alternatives.is_empty() {
            debug!("Term matcher built with an empty glossary");
            return Ok(Self { pattern: None, lookup });
        }

        // Stable sort keeps glossary order among equal lengths
        alternatives.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let body = alternatives
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", body))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .with_context(|| format!("Failed to compile term pattern for {} terms", alternatives.len()))?;

        debug!("Term matcher built with {} terms", alternatives.len());

        Ok(Self {
            pattern: Some(pattern),
            lookup,
        })
    }

    /// Replace every whole-word glossary term with its placeholder
    pub fn mask(&self, text: &str) -> String {
        let pattern = match &self.pattern {
            Some(pattern) if !text.is_empty() => pattern,
            _ => return text.to_string(),
        };

        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = &caps[0];
                match self.lookup.get(&matched.to_lowercase()) {
                    Some(term) => placeholder_token(&term.category, &term.id),
                    None => {
                        warn!("Matched '{}' but it has no glossary entry; left unmasked", matched);
                        matched.to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Number of distinct terms compiled into the matcher
    pub fn term_count(&self) -> usize {
        self.lookup.len()
    }
}
