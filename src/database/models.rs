/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of a dialogue line through the pipeline, derived from its columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStatus {
    /// Imported, not yet masked
    Imported,
    /// Masked, awaiting translation
    Masked,
    /// Has a translation
    Translated,
}

impl fmt::Display for DialogueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueStatus::Imported => write!(f, "imported"),
            DialogueStatus::Masked => write!(f, "masked"),
            DialogueStatus::Translated => write!(f, "translated"),
        }
    }
}

impl std::str::FromStr for DialogueStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imported" => Ok(DialogueStatus::Imported),
            "masked" => Ok(DialogueStatus::Masked),
            "translated" => Ok(DialogueStatus::Translated),
            _ => Err(anyhow::anyhow!("Invalid dialogue status: {}", s)),
        }
    }
}

/// Dialogue line as stored in the `dialogues` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    /// Row id
    pub id: i64,
    /// Key from the string table (sID, EDID or position)
    pub string_key: String,
    /// Editor id of the owning record, if any
    pub edid: Option<String>,
    /// Original text
    pub source: String,
    /// Source with glossary terms replaced by placeholders
    pub masked_source: Option<String>,
    /// Translation, if any
    pub dest: Option<String>,
}

impl DialogueRecord {
    /// Derive the pipeline status from the stored columns
    pub fn status(&self) -> DialogueStatus {
        if self.dest.as_deref().is_some_and(|d| !d.is_empty()) {
            DialogueStatus::Translated
        } else if self.masked_source.is_some() {
            DialogueStatus::Masked
        } else {
            DialogueStatus::Imported
        }
    }

    /// Text to send for translation: masked source if available
    pub fn text_for_translation(&self) -> &str {
        self.masked_source.as_deref().unwrap_or(&self.source)
    }
}

/// Dialogue line to insert or update by key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDialogue {
    pub string_key: String,
    pub edid: Option<String>,
    pub source: String,
    pub dest: Option<String>,
}

/// Cached raw translation of a masked text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// SHA256 of the masked text
    pub masked_hash: String,
    /// Masked text that was translated
    pub masked_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Translation with placeholders still in place
    pub translation: String,
    /// Number of times this entry was reused
    pub hit_count: i64,
}
