/*!
 * Glossary masking for translation.
 *
 * Before a line of dialogue is sent to a translator, every glossary term in
 * it is replaced by a `[Category_id]` placeholder so the translator cannot
 * alter it. After translation the placeholders are swapped back for the
 * original terms.
 *
 * # Architecture
 *
 * - `placeholder`: placeholder grammar and the placeholder -> term cache (unmask)
 * - `matcher`: longest-match, word-bounded term tokenizer (mask)
 * - `engine`: immutable pairing of the two, built explicitly from a glossary
 */

pub mod engine;
pub mod matcher;
pub mod placeholder;

// Re-export main types
pub use engine::MaskingEngine;
pub use matcher::TermMatcher;
pub use placeholder::{find_placeholders, placeholder_token, PlaceholderCache};
