//! crates/page_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, FixedOffset};

/// A book that reading sessions can be recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// Store-assigned identity; 0 means "not yet persisted".
    pub id: i64,
    /// Title of the book. Non-empty, at most 1000 characters.
    pub title: String,
    /// Author/s of the book. If more than one author, split with commas.
    pub author: String,
    /// The page the readable text begins on (excluding table of contents,
    /// forewords etc). At least 1.
    pub starting_page: i32,
    /// The page the readable text finishes on. Never less than
    /// `starting_page`; equal means a one-page book.
    pub ending_page: i32,
    /// Sessions where this book was read. Back-reference only; never
    /// serialized out to clients.
    pub reading_sessions: Vec<ReadingSession>,
}

impl Book {
    /// A book is "started" once at least one session references it.
    /// Computed from the loaded session set, never stored.
    pub fn is_started(&self) -> bool {
        !self.reading_sessions.is_empty()
    }
}

/// One recorded act of reading: how many full pages were read and when.
///
/// If the reader started on page 46 and ended on page 46, they read 0 pages.
/// If they started on page 1 and stopped mid-page-2, they read 1 full page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSession {
    /// Store-assigned identity; 0 means "not yet persisted".
    pub id: i64,
    /// Number of full pages read in this session. At least 0.
    pub number_of_pages: i32,
    /// When the session finished, carrying the recorder's UTC offset.
    /// The offset anchors day-bucketing for daily totals.
    pub date_of_session: DateTime<FixedOffset>,
    /// Absolute page number the reader was on when the session ended.
    /// Defaults to 1 for records that were logged as bare page counts.
    pub page_finished_on: i32,
    /// The book this session was read against, if any.
    pub book_id: Option<i64>,
}
