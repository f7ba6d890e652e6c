//! crates/page_tracker_core/src/books.rs
//!
//! The book catalog service: CRUD over `Book` records plus the
//! started/not-started lifecycle rule. A book with at least one linked
//! session has its starting page locked and cannot be deleted.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::Book;
use crate::ports::{DatabaseService, PortError, PortResult};

/// Manages `Book` records and enforces the started-book lifecycle rules.
#[derive(Clone)]
pub struct BookService {
    db: Arc<dyn DatabaseService>,
}

impl BookService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Gets a book by its id, or `None` if it doesn't exist.
    pub async fn get_book(&self, id: i64) -> PortResult<Option<Book>> {
        self.db.get_book(id).await
    }

    /// Gets all books, ordered by author then title.
    ///
    /// The ordering uses the store's default collation (byte order on the
    /// SQLite backend), not a locale-aware sort.
    pub async fn get_books(&self) -> PortResult<Vec<Book>> {
        self.db.list_books().await
    }

    /// Creates a new book.
    ///
    /// Any caller-supplied id or reading sessions are discarded before
    /// persisting. Fails with a validation error if the ending page is
    /// earlier than the starting page.
    pub async fn create_book(&self, mut new_book: Book) -> PortResult<Book> {
        info!(title = %new_book.title, author = %new_book.author, "Creating new book");

        validate_page_range(&new_book)?;

        // Ignore the caller's id and sessions; the store assigns identity
        // and sessions are only ever created through the ledger.
        new_book.id = 0;
        new_book.reading_sessions.clear();

        let created = self.db.insert_book(new_book).await?;
        info!(book_id = created.id, "Successfully created book");
        Ok(created)
    }

    /// Updates the book with the given id. Does not touch reading sessions.
    ///
    /// The path id is authoritative; any id inside `updated_book` is
    /// ignored. The starting page cannot change once the book has been
    /// started.
    pub async fn update_book(&self, id: i64, updated_book: Book) -> PortResult<Book> {
        let mut existing = match self.db.get_book_with_sessions(id).await? {
            Some(book) => book,
            None => {
                error!(book_id = id, "Book was not found");
                return Err(PortError::NotFound { entity: "Book", id });
            }
        };

        if existing.starting_page != updated_book.starting_page && existing.is_started() {
            error!(
                book_id = id,
                "Book starting page can't be updated. Book has already been started."
            );
            return Err(PortError::Conflict {
                id,
                title: existing.title.clone(),
                reason: format!(
                    "Cannot update the starting page of \"{}\" because it's already been started.",
                    existing.title
                ),
            });
        }

        validate_page_range(&updated_book)?;

        info!(book_id = id, "Updating book");

        existing.author = updated_book.author;
        existing.title = updated_book.title;
        existing.starting_page = updated_book.starting_page;
        existing.ending_page = updated_book.ending_page;
        self.db.update_book(&existing).await?;

        Ok(existing)
    }

    /// Deletes the book with the given id. Started books cannot be deleted.
    pub async fn delete_book(&self, id: i64) -> PortResult<()> {
        let existing = match self.db.get_book_with_sessions(id).await? {
            Some(book) => book,
            None => {
                error!(book_id = id, "Book was not found");
                return Err(PortError::NotFound { entity: "Book", id });
            }
        };

        if existing.is_started() {
            error!(
                book_id = id,
                "Book can't be deleted. Book has already been started."
            );
            return Err(PortError::Conflict {
                id,
                title: existing.title.clone(),
                reason: format!(
                    "Cannot delete \"{}\" because it's already been started.",
                    existing.title
                ),
            });
        }

        info!(book_id = id, "Deleting book");
        self.db.delete_book(id).await
    }
}

/// The ending page can't be earlier than the starting page; equal is a
/// one-page book and is allowed.
fn validate_page_range(book: &Book) -> PortResult<()> {
    if book.ending_page < book.starting_page {
        return Err(PortError::Validation {
            field: "ending_page",
            message: "Ending Page can't be earlier than the Starting Page".to_string(),
        });
    }
    Ok(())
}
