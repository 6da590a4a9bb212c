/*!
 * Masking engine: matcher and placeholder cache built from one glossary.
 */

use anyhow::Result;
use log::info;

use super::matcher::TermMatcher;
use super::placeholder::PlaceholderCache;
use crate::glossary::Glossary;

/// Immutable masking state for one glossary.
///
/// Placeholders produced by one engine are only meaningful to an engine built
/// from the same glossary; `rebuild` bumps `generation` so callers can tell
/// that earlier masked text is stale.
#[derive(Debug, Clone)]
pub struct MaskingEngine {
    matcher: TermMatcher,
    cache: PlaceholderCache,
    generation: u64,
}

impl MaskingEngine {
    /// Build the engine from a glossary
    pub fn build(glossary: &Glossary) -> Result<Self> {
        let matcher = TermMatcher::build(glossary.terms())?;
        let cache = PlaceholderCache::from_terms(glossary.terms());

        info!(
            "Masking engine ready: {} terms in {} categories",
            matcher.term_count(),
            glossary.categories().len()
        );

        Ok(Self {
            matcher,
            cache,
            generation: 0,
        })
    }

    /// Engine that leaves all text unchanged
    pub fn empty() -> Self {
        Self {
            matcher: TermMatcher::empty(),
            cache: PlaceholderCache::default(),
            generation: 0,
        }
    }

    /// Discard the current state and rebuild from `glossary`
    pub fn rebuild(&mut self, glossary: &Glossary) -> Result<()> {
        let fresh = Self::build(glossary)?;
        self.matcher = fresh.matcher;
        self.cache = fresh.cache;
        self.generation += 1;
        Ok(())
    }

    /// Replace glossary terms with placeholders
    pub fn mask(&self, text: &str) -> String {
        self.matcher.mask(text)
    }

    /// Replace placeholders with glossary terms
    pub fn unmask(&self, text: &str) -> String {
        self.cache.unmask(text)
    }

    pub fn term_count(&self) -> usize {
        self.matcher.term_count()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
