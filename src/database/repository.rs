/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::connection::DatabaseConnection;
use super::models::{DialogueRecord, MemoryRecord, NewDialogue};
use crate::glossary::{Glossary, GlossaryTerm};

const DIALOGUE_COLUMNS: &str = "id, string_key, edid, source, masked_source, dest";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Glossary Operations
    // =========================================================================

    /// Replace the stored glossary.
    ///
    /// Every masked source is cleared in the same transaction since it was
    /// produced by the previous glossary.
    pub async fn replace_glossary(&self, glossary: &Glossary) -> Result<usize> {
        let terms = glossary.terms().to_vec();

        self.db
            .transaction_async(move |tx| {
                tx.execute("DELETE FROM glossary_terms", [])?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO glossary_terms (id, term, category, position) VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for (position, term) in terms.iter().enumerate() {
                        stmt.execute(params![term.id, term.term, term.category, position as i64])?;
                    }
                }
                let invalidated = tx.execute(
                    "UPDATE dialogues SET masked_source = NULL WHERE masked_source IS NOT NULL",
                    [],
                )?;
                debug!(
                    "Stored {} glossary terms, invalidated {} masked sources",
                    terms.len(),
                    invalidated
                );
                Ok(terms.len())
            })
            .await
    }

    /// Stored glossary terms in insertion order
    pub async fn list_glossary(&self) -> Result<Vec<GlossaryTerm>> {
        self.db
            .execute_async(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, term, category FROM glossary_terms ORDER BY position")?;
                let terms = stmt
                    .query_map([], |row| {
                        Ok(GlossaryTerm {
                            id: row.get(0)?,
                            term: row.get(1)?,
                            category: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(terms)
            })
            .await
    }

    // =========================================================================
    // Dialogue Operations
    // =========================================================================

    /// Insert dialogue lines, updating lines whose key already exists.
    ///
    /// A changed source drops the stale masked source and translation; the
    /// incoming `dest` (or nothing) replaces them. For an unchanged source an
    /// incoming empty `dest` keeps the stored translation.
    pub async fn upsert_dialogues(&self, entries: Vec<NewDialogue>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO dialogues (string_key, edid, source, dest, updated_at)
                    VALUES (?1, ?2, ?3, ?4, datetime('now'))
                    ON CONFLICT(string_key) DO UPDATE SET
                        edid = excluded.edid,
                        masked_source = CASE WHEN dialogues.source = excluded.source
                                             THEN dialogues.masked_source ELSE NULL END,
                        source = excluded.source,
                        dest = CASE WHEN dialogues.source = excluded.source
                                    THEN COALESCE(excluded.dest, dialogues.dest)
                                    ELSE excluded.dest END,
                        updated_at = excluded.updated_at
                    "#,
                )?;

                for entry in &entries {
                    let dest = entry.dest.as_deref().filter(|d| !d.is_empty());
                    stmt.execute(params![entry.string_key, entry.edid, entry.source, dest])?;
                }

                debug!("Upserted {} dialogue lines", entries.len());
                Ok(entries.len())
            })
            .await
    }

    /// All dialogue lines in import order
    pub async fn list_dialogues(&self) -> Result<Vec<DialogueRecord>> {
        self.db
            .execute_async(|conn| {
                let sql = format!("SELECT {} FROM dialogues ORDER BY id", DIALOGUE_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map([], Self::dialogue_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
    }

    /// Get a dialogue line by row id
    pub async fn get_dialogue(&self, id: i64) -> Result<Option<DialogueRecord>> {
        self.db
            .execute_async(move |conn| {
                let sql = format!("SELECT {} FROM dialogues WHERE id = ?1", DIALOGUE_COLUMNS);
                let record = conn
                    .query_row(&sql, [id], Self::dialogue_from_row)
                    .optional()?;
                Ok(record)
            })
            .await
    }

    fn dialogue_from_row(row: &Row<'_>) -> rusqlite::Result<DialogueRecord> {
        Ok(DialogueRecord {
            id: row.get(0)?,
            string_key: row.get(1)?,
            edid: row.get(2)?,
            source: row.get(3)?,
            masked_source: row.get(4)?,
            dest: row.get(5)?,
        })
    }

    /// Store masked sources by row id
    pub async fn update_masked_sources(&self, updates: Vec<(i64, String)>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    "UPDATE dialogues SET masked_source = ?2, updated_at = datetime('now') WHERE id = ?1",
                )?;
                let mut updated = 0;
                for (id, masked) in &updates {
                    updated += stmt.execute(params![id, masked])?;
                }
                Ok(updated)
            })
            .await
    }

    /// Store translations by row id
    pub async fn update_translations(&self, updates: Vec<(i64, String)>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    "UPDATE dialogues SET dest = ?2, updated_at = datetime('now') WHERE id = ?1",
                )?;
                let mut updated = 0;
                for (id, dest) in &updates {
                    updated += stmt.execute(params![id, dest])?;
                }
                Ok(updated)
            })
            .await
    }

    /// Remove every translation, keeping sources
    pub async fn clear_translations(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| {
                let cleared = conn.execute(
                    "UPDATE dialogues SET dest = NULL, updated_at = datetime('now') WHERE dest IS NOT NULL",
                    [],
                )?;
                Ok(cleared)
            })
            .await
    }

    /// Delete every dialogue line
    pub async fn delete_all_dialogues(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM dialogues", [])?;
                Ok(deleted)
            })
            .await
    }

    // =========================================================================
    // Translation Memory Operations
    // =========================================================================

    /// Compute SHA256 hash of text
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Look up the stored raw translation of a masked text
    pub async fn lookup_memory(
        &self,
        masked_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<String>> {
        let masked_text = masked_text.to_string();
        let source_language = source_language.to_string();
        let target_language = target_language.to_string();

        self.db
            .execute_async(move |conn| {
                Self::lookup_memory_sync(conn, &masked_text, &source_language, &target_language)
            })
            .await
    }

    /// Look up many masked texts at once; misses are absent from the map
    pub async fn lookup_memory_batch(
        &self,
        masked_texts: Vec<String>,
        source_language: &str,
        target_language: &str,
    ) -> Result<HashMap<String, String>> {
        let source_language = source_language.to_string();
        let target_language = target_language.to_string();

        self.db
            .execute_async(move |conn| {
                let mut found = HashMap::new();
                for text in masked_texts {
                    if let Some(translation) =
                        Self::lookup_memory_sync(conn, &text, &source_language, &target_language)?
                    {
                        found.insert(text, translation);
                    }
                }
                Ok(found)
            })
            .await
    }

    fn lookup_memory_sync(
        conn: &Connection,
        masked_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<String>> {
        let masked_hash = Self::hash_text(masked_text);
        let result: Option<(i64, String)> = conn
            .query_row(
                r#"
                SELECT id, translation
                FROM translation_memory
                WHERE masked_hash = ?1
                  AND source_language = ?2
                  AND target_language = ?3
                "#,
                params![masked_hash, source_language, target_language],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match result {
            Some((id, translation)) => {
                conn.execute(
                    "UPDATE translation_memory SET hit_count = hit_count + 1 WHERE id = ?1",
                    [id],
                )?;
                debug!("Translation memory hit");
                Ok(Some(translation))
            }
            None => Ok(None),
        }
    }

    /// Store raw translations of masked texts, replacing older ones
    pub async fn store_memory(
        &self,
        entries: Vec<(String, String)>,
        source_language: &str,
        target_language: &str,
    ) -> Result<usize> {
        let source_language = source_language.to_string();
        let target_language = target_language.to_string();

        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO translation_memory (
                        masked_hash, masked_text, source_language, target_language,
                        translation, hit_count, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, 0, datetime('now'))
                    ON CONFLICT(masked_hash, source_language, target_language)
                    DO UPDATE SET translation = excluded.translation
                    "#,
                )?;
                for (masked_text, translation) in &entries {
                    stmt.execute(params![
                        Self::hash_text(masked_text),
                        masked_text,
                        source_language,
                        target_language,
                        translation,
                    ])?;
                }
                Ok(entries.len())
            })
            .await
    }

    /// Most reused memory entries for a language pair
    pub async fn top_memory_entries(
        &self,
        source_language: &str,
        target_language: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>> {
        let source_language = source_language.to_string();
        let target_language = target_language.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT masked_hash, masked_text, source_language, target_language, translation, hit_count
                    FROM translation_memory
                    WHERE source_language = ?1 AND target_language = ?2
                    ORDER BY hit_count DESC, id ASC
                    LIMIT ?3
                    "#,
                )?;
                let records = stmt
                    .query_map(params![source_language, target_language, limit as i64], |row| {
                        Ok(MemoryRecord {
                            masked_hash: row.get(0)?,
                            masked_text: row.get(1)?,
                            source_language: row.get(2)?,
                            target_language: row.get(3)?,
                            translation: row.get(4)?,
                            hit_count: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
    }

    /// Clear the translation memory
    pub async fn clear_memory(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translation_memory", [])?;
                Ok(deleted)
            })
            .await
    }
}
