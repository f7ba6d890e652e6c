//! In-memory fakes for the port traits, shared by the service unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::{Book, ReadingSession};
use crate::ports::{Clock, DatabaseService, PortResult};

/// Parses an RFC 3339 string into an offset-carrying instant.
pub fn instant(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("test instant must be valid RFC 3339")
}

/// A not-yet-persisted book candidate.
pub fn book(title: &str, author: &str, starting_page: i32, ending_page: i32) -> Book {
    Book {
        id: 0,
        title: title.to_string(),
        author: author.to_string(),
        starting_page,
        ending_page,
        reading_sessions: Vec::new(),
    }
}

/// A session linked to `book_id`, for seeding the started-book state.
pub fn session_for_book(book_id: i64, number_of_pages: i32) -> ReadingSession {
    ReadingSession {
        id: 0,
        number_of_pages,
        date_of_session: instant("2024-01-01T00:00:00+00:00"),
        page_finished_on: 1,
        book_id: Some(book_id),
    }
}

/// A clock pinned to one instant.
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[derive(Default)]
struct Inner {
    books: Vec<Book>,
    sessions: Vec<ReadingSession>,
    next_book_id: i64,
    next_session_id: i64,
}

/// An in-memory stand-in for the persistence port.
#[derive(Default)]
pub struct InMemoryDb {
    inner: Mutex<Inner>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> Vec<Book> {
        self.inner.lock().unwrap().books.clone()
    }

    pub fn sessions(&self) -> Vec<ReadingSession> {
        self.inner.lock().unwrap().sessions.clone()
    }

    /// Seeds an unlinked session, as the recording operations would create.
    pub fn add_session(
        &self,
        number_of_pages: i32,
        date_of_session: DateTime<FixedOffset>,
        page_finished_on: i32,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_session_id += 1;
        let id = inner.next_session_id;
        inner.sessions.push(ReadingSession {
            id,
            number_of_pages,
            date_of_session,
            page_finished_on,
            book_id: None,
        });
    }

    /// Seeds a session linked to `book_id`, flipping that book to started.
    pub fn link_session(&self, book_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_session_id += 1;
        let id = inner.next_session_id;
        let mut session = session_for_book(book_id, 5);
        session.id = id;
        inner.sessions.push(session);
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn get_book(&self, id: i64) -> PortResult<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn get_book_with_sessions(&self, id: i64) -> PortResult<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.iter().find(|b| b.id == id).cloned().map(|mut b| {
            b.reading_sessions = inner
                .sessions
                .iter()
                .filter(|s| s.book_id == Some(id))
                .cloned()
                .collect();
            b
        }))
    }

    async fn list_books(&self) -> PortResult<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        let mut books = inner.books.clone();
        // Byte order, matching SQLite's BINARY collation.
        books.sort_by(|a, b| {
            (a.author.as_str(), a.title.as_str()).cmp(&(b.author.as_str(), b.title.as_str()))
        });
        Ok(books)
    }

    async fn insert_book(&self, mut book: Book) -> PortResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_book_id += 1;
        book.id = inner.next_book_id;
        inner.books.push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, book: &Book) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.books.iter_mut().find(|b| b.id == book.id) {
            existing.author = book.author.clone();
            existing.title = book.title.clone();
            existing.starting_page = book.starting_page;
            existing.ending_page = book.ending_page;
        }
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.books.retain(|b| b.id != id);
        Ok(())
    }

    async fn insert_session(&self, mut session: ReadingSession) -> PortResult<ReadingSession> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_session_id += 1;
        session.id = inner.next_session_id;
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn latest_session(&self) -> PortResult<Option<ReadingSession>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .iter()
            .max_by_key(|s| s.date_of_session)
            .cloned())
    }

    async fn sessions_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> PortResult<Vec<ReadingSession>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .iter()
            .filter(|s| s.date_of_session >= start && s.date_of_session < end)
            .cloned()
            .collect())
    }
}
