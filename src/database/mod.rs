/*!
 * Database module for persistent storage of dialogue lines and translations.
 *
 * This module provides SQLite-based persistence for:
 * - The glossary used for masking
 * - Imported dialogue lines with their masked source and translation
 * - Translation memory keyed by masked text and language pair
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{DialogueRecord, DialogueStatus, MemoryRecord, NewDialogue};
pub use repository::Repository;
