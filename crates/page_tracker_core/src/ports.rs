//! crates/page_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or clocks.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::{Book, ReadingSession};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every port and service operation.
///
/// All four kinds propagate to the immediate caller untranslated; mapping to
/// a transport representation (status codes, problem bodies) is the calling
/// layer's job, never the core's.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Caller input violates a field-level constraint. Always raised before
    /// any persistence attempt.
    #[error("Validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The referenced entity does not exist.
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The operation is individually valid but breaks a lifecycle rule
    /// (editing the starting page of, or deleting, a started book).
    #[error("{reason}")]
    Conflict {
        id: i64,
        title: String,
        reason: String,
    },

    /// The persistence layer itself failed. Not classified further here.
    #[error("Storage error: {0}")]
    Store(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The persistence port consumed by both domain services.
///
/// Each write method is a single unit-of-work commit; the services never
/// compose multiple writes into one call.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Books ---
    /// Fetch a book by id, without its linked sessions.
    async fn get_book(&self, id: i64) -> PortResult<Option<Book>>;

    /// Fetch a book by id with `reading_sessions` populated. Used by the
    /// paths that need the started/unstarted predicate.
    async fn get_book_with_sessions(&self, id: i64) -> PortResult<Option<Book>>;

    /// All books ordered by author then title, ascending, in the store's
    /// default collation.
    async fn list_books(&self) -> PortResult<Vec<Book>>;

    /// Insert a new book and return it with its assigned id.
    async fn insert_book(&self, book: Book) -> PortResult<Book>;

    /// Overwrite the stored row for `book.id` with `book`'s fields.
    /// Linked sessions are not touched.
    async fn update_book(&self, book: &Book) -> PortResult<()>;

    /// Remove the book row. The caller has already checked existence and
    /// the delete-lock.
    async fn delete_book(&self, id: i64) -> PortResult<()>;

    // --- Reading sessions ---
    /// Insert a new session and return it with its assigned id.
    async fn insert_session(&self, session: ReadingSession) -> PortResult<ReadingSession>;

    /// The most recently dated session, if any. Ties on `date_of_session`
    /// are broken arbitrarily by the store.
    async fn latest_session(&self) -> PortResult<Option<ReadingSession>>;

    /// All sessions with `start <= date_of_session < end`, compared as
    /// instants regardless of each record's stored offset.
    async fn sessions_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> PortResult<Vec<ReadingSession>>;
}

/// The time source injected into time-dependent logic. Domain code never
/// reads the ambient system clock directly, so session timestamps and
/// day-bucketing stay deterministic under test.
pub trait Clock: Send + Sync {
    /// The current moment, carrying the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}
