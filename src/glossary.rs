/*!
 * Glossary of protected game terms.
 *
 * A glossary is an ordered list of terms (names, locations, items, ...)
 * that must survive machine translation untouched. Each term carries a
 * category and an id; both end up inside the `[Category_id]` placeholders
 * produced by the masking engine, so both are validated on load.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::errors::GlossaryError;
use crate::masking::placeholder::placeholder_token;

static CATEGORY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("Invalid category regex"));

static ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+$").expect("Invalid id regex"));

/// Number of hex characters kept from the term hash
const GENERATED_ID_LEN: usize = 8;

/// A single protected term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    /// Stable identifier, lowercase alphanumeric
    pub id: String,
    /// Term text as it appears in source dialogue
    pub term: String,
    /// Short alphabetic category tag (e.g. "Location")
    pub category: String,
}

impl GlossaryTerm {
    /// Create a new term without validating it
    pub fn new(id: impl Into<String>, term: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            category: category.into(),
        }
    }

    /// Check the term against the placeholder grammar
    pub fn validate(&self) -> Result<(), GlossaryError> {
        if self.term.trim().is_empty() {
            return Err(GlossaryError::EmptyTerm(self.category.clone()));
        }
        if !CATEGORY_REGEX.is_match(&self.category) {
            return Err(GlossaryError::InvalidCategory(self.category.clone()));
        }
        if !ID_REGEX.is_match(&self.id) {
            return Err(GlossaryError::InvalidId {
                id: self.id.clone(),
                term: self.term.clone(),
            });
        }
        Ok(())
    }
}

/// Derive a stable id from the lower-cased term text
pub fn derive_term_id(term: &str) -> String {
    let digest = Sha256::digest(term.to_lowercase().as_bytes());
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(GENERATED_ID_LEN)
        .collect()
}

/// Ordered, case-insensitively unique collection of glossary terms
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
    index: HashMap<String, usize>,
    tokens: HashSet<String>,
}

impl Glossary {
    /// Create an empty glossary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a glossary from explicit terms.
    ///
    /// Later duplicates (compared case-insensitively) are dropped with a warning.
    /// Two different terms sharing a category and id are rejected.
    pub fn from_terms(terms: Vec<GlossaryTerm>) -> Result<Self, GlossaryError> {
        let mut glossary = Self::new();
        for term in terms {
            glossary.push(term)?;
        }
        Ok(glossary)
    }

    /// Build a glossary from categorized term lists, generating ids.
    ///
    /// Categories are visited in alphabetical order, so when the same term is
    /// listed under several categories the alphabetically first one keeps it.
    pub fn from_categorized(lists: &BTreeMap<String, Vec<String>>) -> Result<Self, GlossaryError> {
        let mut glossary = Self::new();
        let mut used_ids: HashSet<String> = HashSet::new();

        for (category, terms) in lists {
            for term in terms {
                let term = term.trim();
                if glossary.contains(term) {
                    warn!("Duplicate glossary term '{}' in category '{}' ignored", term, category);
                    continue;
                }

                let base_id = derive_term_id(term);
                let mut id = base_id.clone();
                let mut suffix = 1;
                while used_ids.contains(&id) {
                    id = format!("{}{}", base_id, suffix);
                    suffix += 1;
                }

                glossary.push(GlossaryTerm::new(id.clone(), term, category.clone()))?;
                used_ids.insert(id);
            }
        }

        debug!("Built glossary with {} terms", glossary.len());
        Ok(glossary)
    }

    /// Parse glossary JSON: either `{category: [terms]}` or `[{id, term, category}]`
    pub fn from_json_str(content: &str) -> Result<Self, GlossaryError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| GlossaryError::InvalidFormat(e.to_string()))?;

        match value {
            serde_json::Value::Object(_) => {
                let lists: BTreeMap<String, Vec<String>> = serde_json::from_value(value)
                    .map_err(|e| GlossaryError::InvalidFormat(e.to_string()))?;
                Self::from_categorized(&lists)
            }
            serde_json::Value::Array(_) => {
                let terms: Vec<GlossaryTerm> = serde_json::from_value(value)
                    .map_err(|e| GlossaryError::InvalidFormat(e.to_string()))?;
                Self::from_terms(terms)
            }
            _ => Err(GlossaryError::InvalidFormat(
                "expected a JSON object or array".to_string(),
            )),
        }
    }

    /// Load a glossary JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {:?}", path))?;
        let glossary = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse glossary file: {:?}", path))?;
        Ok(glossary)
    }

    /// Append a term, ignoring case-insensitive duplicates.
    ///
    /// Fails when the term's placeholder is already taken by another term.
    pub fn push(&mut self, term: GlossaryTerm) -> Result<(), GlossaryError> {
        term.validate()?;
        let key = term.term.to_lowercase();
        if self.index.contains_key(&key) {
            warn!("Duplicate glossary term '{}' ignored", term.term);
            return Ok(());
        }
        let token = placeholder_token(&term.category, &term.id);
        if !self.tokens.insert(token.clone()) {
            return Err(GlossaryError::DuplicateId {
                token,
                term: term.term,
            });
        }
        self.index.insert(key, self.terms.len());
        self.terms.push(term);
        Ok(())
    }

    /// Case-insensitive membership test
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(&term.to_lowercase())
    }

    /// Case-insensitive lookup
    pub fn get(&self, term: &str) -> Option<&GlossaryTerm> {
        self.index.get(&term.to_lowercase()).map(|&i| &self.terms[i])
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryTerm> {
        self.terms.iter()
    }

    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    /// Term count per category
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for term in &self.terms {
            *counts.entry(term.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}
