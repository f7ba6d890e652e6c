//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use page_tracker_core::domain::{Book, ReadingSession};
use page_tracker_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, SqlitePool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> PortError {
    PortError::Store(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    author: String,
    starting_page: i64,
    ending_page: i64,
}

impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            starting_page: self.starting_page as i32,
            ending_page: self.ending_page as i32,
            reading_sessions: Vec::new(),
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: i64,
    number_of_pages: i64,
    date_of_session: i64,
    utc_offset_seconds: i64,
    page_finished_on: i64,
    book_id: Option<i64>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<ReadingSession> {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds as i32).ok_or_else(|| {
            PortError::Store(format!(
                "Session {} has an invalid UTC offset of {} seconds",
                self.id, self.utc_offset_seconds
            ))
        })?;
        let instant = DateTime::from_timestamp_millis(self.date_of_session).ok_or_else(|| {
            PortError::Store(format!(
                "Session {} has an out-of-range timestamp {}",
                self.id, self.date_of_session
            ))
        })?;

        Ok(ReadingSession {
            id: self.id,
            number_of_pages: self.number_of_pages as i32,
            date_of_session: instant.with_timezone(&offset),
            page_finished_on: self.page_finished_on as i32,
            book_id: self.book_id,
        })
    }
}

const SESSION_COLUMNS: &str =
    "id, number_of_pages, date_of_session, utc_offset_seconds, page_finished_on, book_id";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_book(&self, id: i64) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, author, starting_page, ending_page FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(record.map(BookRecord::to_domain))
    }

    async fn get_book_with_sessions(&self, id: i64) -> PortResult<Option<Book>> {
        let Some(mut book) = self.get_book(id).await? else {
            return Ok(None);
        };

        let records = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions WHERE book_id = ?"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        book.reading_sessions = records
            .into_iter()
            .map(SessionRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(Some(book))
    }

    async fn list_books(&self) -> PortResult<Vec<Book>> {
        // BINARY collation (SQLite's default): byte order, not locale order.
        let records = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, author, starting_page, ending_page FROM books \
             ORDER BY author ASC, title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(records.into_iter().map(BookRecord::to_domain).collect())
    }

    async fn insert_book(&self, mut book: Book) -> PortResult<Book> {
        let result = sqlx::query(
            "INSERT INTO books (title, author, starting_page, ending_page) VALUES (?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.starting_page)
        .bind(book.ending_page)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        book.id = result.last_insert_rowid();
        Ok(book)
    }

    async fn update_book(&self, book: &Book) -> PortResult<()> {
        sqlx::query(
            "UPDATE books SET title = ?, author = ?, starting_page = ?, ending_page = ? \
             WHERE id = ?",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.starting_page)
        .bind(book.ending_page)
        .bind(book.id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> PortResult<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn insert_session(&self, mut session: ReadingSession) -> PortResult<ReadingSession> {
        let result = sqlx::query(
            "INSERT INTO reading_sessions \
             (number_of_pages, date_of_session, utc_offset_seconds, page_finished_on, book_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.number_of_pages)
        .bind(session.date_of_session.timestamp_millis())
        .bind(i64::from(session.date_of_session.offset().local_minus_utc()))
        .bind(session.page_finished_on)
        .bind(session.book_id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        session.id = result.last_insert_rowid();
        Ok(session)
    }

    async fn latest_session(&self) -> PortResult<Option<ReadingSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions \
             ORDER BY date_of_session DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        record.map(SessionRecord::to_domain).transpose()
    }

    async fn sessions_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> PortResult<Vec<ReadingSession>> {
        // Instant comparison on the stored unix timestamp; each row's own
        // offset plays no part in whether it falls inside the window.
        let records = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions \
             WHERE date_of_session >= ? AND date_of_session < ?"
        ))
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        records
            .into_iter()
            .map(SessionRecord::to_domain)
            .collect()
    }
}
