/*!
 * Validation module for translation quality assurance.
 *
 * This module provides the checks run on translated dialogue:
 * - Anomaly classification (missing, untranslated, DLC, technical, punctuation)
 * - Placeholder validation (glossary placeholders kept by the translator)
 * - Anomaly reports over a whole string table
 *
 * # Architecture
 *
 * - `anomalies`: Independent predicates and the `classify` tag set
 * - `placeholders`: Compares placeholders before and after translation
 * - `report`: Aggregates anomaly tags over many records
 */

pub mod anomalies;
pub mod placeholders;
pub mod report;

// Re-export main types
pub use anomalies::{classify, AnomalySet, AnomalyTag};
pub use placeholders::{PlaceholderValidationResult, PlaceholderValidator};
pub use report::{AnomalyReport, FlaggedRecord};
