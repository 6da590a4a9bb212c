/*!
 * Database connection management.
 *
 * This module handles SQLite database connection creation, initialization,
 * and provides async-safe access patterns using tokio's spawn_blocking.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "dialoc.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "dialoc";

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Create a new database connection at the default location
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Create a new database connection at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        // Initialize schema
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        // Initialize schema
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        // Try to use the system data directory
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        let db_dir = base_dir.join(DEFAULT_DB_DIRNAME);
        let db_path = db_dir.join(DEFAULT_DB_FILENAME);

        Ok(db_path)
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

        f(&conn)
    }

    /// Execute a database operation asynchronously using spawn_blocking
    ///
    /// This is the preferred method for async contexts as it prevents
    /// blocking the async runtime.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Begin a transaction and execute operations within it
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T>,
    {
        let mut conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    /// Begin an async transaction and execute operations within it
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let count = |sql: &str| -> i64 { conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0) };

            let glossary_terms = count("SELECT COUNT(*) FROM glossary_terms");
            let dialogues = count("SELECT COUNT(*) FROM dialogues");
            let masked_dialogues = count("SELECT COUNT(*) FROM dialogues WHERE masked_source IS NOT NULL");
            let translated_dialogues =
                count("SELECT COUNT(*) FROM dialogues WHERE dest IS NOT NULL AND dest != ''");
            let memory_entries = count("SELECT COUNT(*) FROM translation_memory");
            let memory_hits = count("SELECT COALESCE(SUM(hit_count), 0) FROM translation_memory");

            // Get file size if not in-memory
            let file_size = if self.db_path.to_string_lossy() != ":memory:" {
                std::fs::metadata(&self.db_path)
                    .map(|m| m.len())
                    .unwrap_or(0)
            } else {
                0
            };

            Ok(DatabaseStats {
                glossary_terms,
                dialogues,
                masked_dialogues,
                translated_dialogues,
                memory_entries,
                memory_hits,
                file_size_bytes: file_size,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DatabaseStats {
    /// Number of glossary terms
    pub glossary_terms: i64,
    /// Number of imported dialogue lines
    pub dialogues: i64,
    /// Lines with a masked source
    pub masked_dialogues: i64,
    /// Lines with a non-empty translation
    pub translated_dialogues: i64,
    /// Translation memory size
    pub memory_entries: i64,
    /// Total translation memory reuses
    pub memory_hits: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Glossary terms: {}, Dialogues: {} (masked {}, translated {}), Memory: {} entries / {} hits, Size: {} KB",
            self.glossary_terms,
            self.dialogues,
            self.masked_dialogues,
            self.translated_dialogues,
            self.memory_entries,
            self.memory_hits,
            self.file_size_bytes / 1024
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSERT_DIALOGUE: &str = "INSERT INTO dialogues (string_key, source, updated_at) VALUES ('k1', 'Hello', datetime('now'))";

    #[test]
    fn test_newInMemory_shouldCreateValidConnection() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create in-memory DB");
        assert_eq!(db.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_new_withFilePath_shouldCreateParentDirectories() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("dialoc.db");

        let db = DatabaseConnection::new(&path).expect("Failed to create file DB");

        assert!(path.exists());
        assert_eq!(db.path(), path.as_path());
    }

    #[test]
    fn test_execute_shouldRunOperation() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        let result = db.execute(|conn| {
            let count: i64 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0))?;
            Ok(count)
        });

        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_transaction_shouldCommitOnSuccess() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        db.transaction(|tx| {
            tx.execute(INSERT_DIALOGUE, [])?;
            Ok(())
        })
        .expect("Transaction failed");

        let count: i64 = db
            .execute(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM dialogues WHERE string_key = 'k1'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();

        assert_eq!(count, 1);
    }

    #[test]
    fn test_transaction_withError_shouldRollBack() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        let result: Result<()> = db.transaction(|tx| {
            tx.execute(INSERT_DIALOGUE, [])?;
            Err(anyhow::anyhow!("abort"))
        });
        assert!(result.is_err());

        assert_eq!(db.stats().unwrap().dialogues, 0);
    }

    #[test]
    fn test_stats_shouldReturnValidStats() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        let stats = db.stats().expect("Failed to get stats");

        assert_eq!(stats, DatabaseStats::default());
    }

    #[tokio::test]
    async fn test_executeAsync_shouldRunInBlockingContext() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        let result = db
            .execute_async(|conn| {
                let count: i64 = conn.query_row("SELECT 42", [], |row| row.get(0))?;
                Ok(count)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_transactionAsync_shouldWork() {
        let db = DatabaseConnection::new_in_memory().expect("Failed to create DB");

        db.transaction_async(|tx| {
            tx.execute(INSERT_DIALOGUE, [])?;
            Ok(())
        })
        .await
        .expect("Async transaction failed");

        let stats = db.stats().unwrap();
        assert_eq!(stats.dialogues, 1);
        assert_eq!(stats.translated_dialogues, 0);
    }
}
