//! `SQLite` storage implementation.
//!
//! Provides persistent storage using `SQLite` with proper transaction
//! management and migration support.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::{Course, CourseListing, CourseQuery, Flashcard, Summary, current_timestamp};
use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
    get_migrations_from,
};
use crate::storage::traits::{Storage, StorageStats};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COURSE_COLUMNS: &str = "id, name, content, sources, created_at";

/// Raw course row before the `sources` JSON is decoded.
type CourseRow = (i64, String, String, String, i64);

/// SQLite-based storage implementation.
///
/// # Examples
///
/// ```no_run
/// use study_buddy::storage::{SqliteStorage, Storage};
///
/// let mut storage = SqliteStorage::open(".study-buddy/study.db").unwrap();
/// storage.init().unwrap();
/// ```
pub struct SqliteStorage {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or configured.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        // journal_mode returns a row, so it goes through query_row
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// Useful for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the current schema version.
    fn get_schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    /// Sets the schema version.
    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn course_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn course_from_row((id, name, content, sources, created_at): CourseRow) -> Result<Course> {
        let sources: Vec<String> = serde_json::from_str(&sources).map_err(StorageError::from)?;
        Ok(Course {
            id: Some(id),
            name,
            content,
            sources,
            created_at,
        })
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }
}

impl Storage for SqliteStorage {
    fn init(&mut self) -> Result<()> {
        let is_init: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;

        if is_init == 0 {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(StorageError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            info!(version = CURRENT_SCHEMA_VERSION, "created schema");
        } else if let Some(current) = self.get_schema_version()?
            && current != CURRENT_SCHEMA_VERSION
        {
            if current > CURRENT_SCHEMA_VERSION {
                return Err(StorageError::Migration(format!(
                    "database schema v{current} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                ))
                .into());
            }
            for migration in get_migrations_from(current) {
                self.conn
                    .execute_batch(migration.sql)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                info!(
                    from = migration.from_version,
                    to = migration.to_version,
                    "applied migration"
                );
            }
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn reset(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            DELETE FROM flashcards;
            DELETE FROM summaries;
            DELETE FROM courses;
        ",
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ==================== Course Operations ====================

    fn add_course(&mut self, course: &Course) -> Result<i64> {
        let sources = serde_json::to_string(&course.sources).map_err(StorageError::from)?;

        self.conn
            .execute(
                r"
            INSERT INTO courses (name, content, sources, created_at)
            VALUES (?, ?, ?, ?)
            ",
                params![course.name, course.content, sources, course.created_at],
            )
            .map_err(StorageError::from)?;

        let id = self.conn.last_insert_rowid();
        debug!(id, name = %course.name, chars = course.content_len(), "stored course");
        Ok(id)
    }

    fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"),
                params![id],
                Self::course_row,
            )
            .optional()
            .map_err(StorageError::from)?;

        row.map(Self::course_from_row).transpose()
    }

    fn get_course_by_name(&self, name: &str) -> Result<Option<Course>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {COURSE_COLUMNS} FROM courses WHERE name = ? \
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![name],
                Self::course_row,
            )
            .optional()
            .map_err(StorageError::from)?;

        row.map(Self::course_from_row).transpose()
    }

    fn list_courses(&self, query: &CourseQuery) -> Result<Vec<CourseListing>> {
        let mut stmt = self
            .conn
            .prepare(
                r"
            SELECT id, name, length(content), created_at
            FROM courses
            WHERE ?1 IS NULL OR instr(lower(name), lower(?1)) > 0
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            ",
            )
            .map_err(StorageError::from)?;

        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = stmt
            .query_map(params![query.name_contains, limit, offset], |row| {
                let content_len: i64 = row.get(2)?;
                Ok(CourseListing {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    content_len: content_len as usize,
                    created_at: row.get(3)?,
                })
            })
            .map_err(StorageError::from)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StorageError::from(e).into())
    }

    fn delete_course(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?", params![id])
            .map_err(StorageError::from)?;
        Ok(deleted > 0)
    }

    fn course_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM courses")
    }

    // ==================== Summary Operations ====================

    fn save_summary(&mut self, summary: &Summary) -> Result<()> {
        self.conn
            .execute(
                r"
            INSERT INTO summaries (course_id, outline, budget, instruction, chunk_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(course_id) DO UPDATE SET
                outline = excluded.outline,
                budget = excluded.budget,
                instruction = excluded.instruction,
                chunk_count = excluded.chunk_count,
                created_at = excluded.created_at
            ",
                params![
                    summary.course_id,
                    summary.outline,
                    summary.budget as i64,
                    summary.instruction,
                    summary.chunk_count as i64,
                    summary.created_at,
                ],
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn get_summary(&self, course_id: i64) -> Result<Option<Summary>> {
        let summary = self
            .conn
            .query_row(
                r"
            SELECT course_id, outline, budget, instruction, chunk_count, created_at
            FROM summaries WHERE course_id = ?
            ",
                params![course_id],
                |row| {
                    let budget: i64 = row.get(2)?;
                    let chunk_count: i64 = row.get(4)?;
                    Ok(Summary {
                        course_id: row.get(0)?,
                        outline: row.get(1)?,
                        budget: budget as usize,
                        instruction: row.get(3)?,
                        chunk_count: chunk_count as usize,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(StorageError::from)?;

        Ok(summary)
    }

    // ==================== Flashcard Operations ====================

    fn replace_flashcards(&mut self, course_id: i64, cards: &[Flashcard]) -> Result<()> {
        let tx = self.conn.transaction().map_err(StorageError::from)?;
        let now = current_timestamp();

        tx.execute("DELETE FROM flashcards WHERE course_id = ?", params![course_id])
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    r"
                INSERT INTO flashcards (course_id, card_index, front, back, created_at)
                VALUES (?, ?, ?, ?, ?)
                ",
                )
                .map_err(StorageError::from)?;

            for card in cards {
                stmt.execute(params![
                    course_id,
                    card.card_index as i64,
                    card.front,
                    card.back,
                    now,
                ])
                .map_err(|e| StorageError::Transaction(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        debug!(course_id, cards = cards.len(), "replaced flashcards");
        Ok(())
    }

    fn get_flashcards(&self, course_id: i64) -> Result<Vec<Flashcard>> {
        let mut stmt = self
            .conn
            .prepare(
                r"
            SELECT id, card_index, front, back
            FROM flashcards
            WHERE course_id = ?
            ORDER BY card_index
            ",
            )
            .map_err(StorageError::from)?;

        let cards = stmt
            .query_map(params![course_id], |row| {
                let card_index: i64 = row.get(1)?;
                Ok(Flashcard {
                    id: Some(row.get(0)?),
                    card_index: card_index as usize,
                    front: row.get(2)?,
                    back: row.get(3)?,
                })
            })
            .map_err(StorageError::from)?;

        cards
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StorageError::from(e).into())
    }

    // ==================== Utility Operations ====================

    fn stats(&self) -> Result<StorageStats> {
        let course_count = self.course_count()?;
        let summary_count = self.count("SELECT COUNT(*) FROM summaries")?;
        let flashcard_count = self.count("SELECT COUNT(*) FROM flashcards")?;
        let total_content_chars =
            self.count("SELECT COALESCE(SUM(length(content)), 0) FROM courses")?;

        let schema_version = self.get_schema_version()?.unwrap_or(0);

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(StorageStats {
            course_count,
            summary_count,
            flashcard_count,
            total_content_chars,
            schema_version,
            db_size,
        })
    }
}
