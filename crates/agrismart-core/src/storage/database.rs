//! Database connection and schema management.

use rusqlite::Connection;
use tracing::info;

use crate::storage::error::StorageResult;

/// Database connection wrapper.
///
/// Manages SQLite connection and schema initialization.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a new database connection at the specified path.
    ///
    /// # Errors
    /// * `StorageError::Connection` - If the database connection fails
    pub fn open(path: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// # Errors
    /// * `StorageError::Connection` - If the database connection fails
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Opens `path` when given, otherwise an in-memory database.
    ///
    /// # Errors
    /// * `StorageError::Connection` - If the database connection fails
    pub fn open_or_in_memory(path: Option<&str>) -> StorageResult<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    /// Gets a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn init_schema(&self) -> StorageResult<()> {
        info!("Initializing database schema");

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                farm_id TEXT,
                body_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
            [],
        )?;

        self.conn.execute(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_farm
            ON documents (collection, farm_id, created_at)
            "#,
            [],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(db: &Database, name: &str) -> bool {
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'index') AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_open_in_memory_creates_schema() {
        let db = Database::open_in_memory().unwrap();
        assert!(table_exists(&db, "documents"));
        assert!(table_exists(&db, "idx_documents_farm"));
    }

    #[test]
    fn test_open_file_is_reopenable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::open(path).unwrap();
            db.conn()
                .execute(
                    "INSERT INTO documents VALUES ('farms', 'f1', NULL, '{}', 't', 't')",
                    [],
                )
                .unwrap();
        }

        let db = Database::open_or_in_memory(Some(path)).unwrap();
        let count: i64 =
            db.conn().query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }
}
