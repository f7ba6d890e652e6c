//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;
use page_tracker_core::domain::{Book, ReadingSession};
use page_tracker_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        get_book_handler,
        list_books_handler,
        create_book_handler,
        update_book_handler,
        delete_book_handler,
        record_pages_handler,
        get_pages_read_handler,
        record_finished_at_handler,
    ),
    components(schemas(BookPayload, BookResponse, ReadingSessionResponse)),
    tags(
        (name = "Page Tracker API", description = "Record books and daily reading sessions.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request body for creating or updating a book. Any supplied `id` is
/// ignored; on update, the path id is authoritative.
#[derive(Deserialize, ToSchema)]
pub struct BookPayload {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub starting_page: i32,
    pub ending_page: i32,
}

impl BookPayload {
    /// Length and non-empty checks belong to the web boundary; the core
    /// service only owns the page-range rule.
    fn validate(&self) -> Result<(), PortError> {
        if self.title.is_empty() {
            return Err(PortError::Validation {
                field: "title",
                message: "Title is required".to_string(),
            });
        }
        if self.title.chars().count() > 1000 {
            return Err(PortError::Validation {
                field: "title",
                message: "Title can't be longer than 1000 characters".to_string(),
            });
        }
        if self.author.is_empty() {
            return Err(PortError::Validation {
                field: "author",
                message: "Author is required".to_string(),
            });
        }
        if self.author.chars().count() > 200 {
            return Err(PortError::Validation {
                field: "author",
                message: "Author can't be longer than 200 characters".to_string(),
            });
        }
        Ok(())
    }

    fn into_domain(self) -> Book {
        Book {
            id: self.id.unwrap_or(0),
            title: self.title,
            author: self.author,
            starting_page: self.starting_page,
            ending_page: self.ending_page,
            reading_sessions: Vec::new(),
        }
    }
}

/// A book as sent to clients. Linked reading sessions are never serialized.
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub starting_page: i32,
    pub ending_page: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            starting_page: book.starting_page,
            ending_page: book.ending_page,
        }
    }
}

/// A recorded reading session as sent to clients.
#[derive(Serialize, ToSchema)]
pub struct ReadingSessionResponse {
    pub id: i64,
    pub number_of_pages: i32,
    /// RFC 3339 timestamp carrying the recorder's UTC offset.
    #[schema(value_type = String, format = DateTime)]
    pub date_of_session: chrono::DateTime<chrono::FixedOffset>,
    pub page_finished_on: i32,
    pub book_id: Option<i64>,
}

impl From<ReadingSession> for ReadingSessionResponse {
    fn from(session: ReadingSession) -> Self {
        Self {
            id: session.id,
            number_of_pages: session.number_of_pages,
            date_of_session: session.date_of_session,
            page_finished_on: session.page_finished_on,
            book_id: session.book_id,
        }
    }
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router. Swagger UI is merged on top by the binary.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route(
            "/books/{id}",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .route("/reading-session/pages", get(get_pages_read_handler))
        .route(
            "/reading-session/pages/{number_of_pages}",
            post(record_pages_handler),
        )
        .route(
            "/reading-session/finished-at/{page_number}",
            post(record_finished_at_handler),
        )
}

//=========================================================================================
// Health
//=========================================================================================

/// Returns a message if the service is running.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = String))
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> String {
    format!("Running on {}.", state.clock.now().to_rfc3339())
}

//=========================================================================================
// Book Handlers
//=========================================================================================

/// Gets a book by its id.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = i64, Path, description = "The id of the book to get")),
    responses(
        (status = 200, description = "The requested book", body = BookResponse),
        (status = 404, description = "Book was not found")
    )
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BookResponse>> {
    match state.books.get_book(id).await? {
        Some(book) => Ok(Json(book.into())),
        None => Err(ApiError::Port(PortError::NotFound { entity: "Book", id })),
    }
}

/// Gets all books, ordered by author then title.
#[utoipa::path(
    get,
    path = "/books",
    responses((status = 200, description = "All books", body = [BookResponse]))
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let books = state.books.get_books().await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// Creates a new book. Id and reading-session values in the body are ignored.
#[utoipa::path(
    post,
    path = "/books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Successfully created a book", body = BookResponse),
        (status = 400, description = "There were validation errors")
    )
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookPayload>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    let created = state.books.create_book(payload.into_domain()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(created))))
}

/// Updates the given book. The starting page can't be edited once the book
/// has been started.
#[utoipa::path(
    put,
    path = "/books/{id}",
    params(("id" = i64, Path, description = "The id of the book to update")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book was successfully updated", body = BookResponse),
        (status = 400, description = "There were validation errors"),
        (status = 404, description = "Book was not found"),
        (status = 422, description = "Provided update was not allowed")
    )
)]
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<BookPayload>,
) -> ApiResult<Json<BookResponse>> {
    payload.validate()?;
    let updated = state.books.update_book(id, payload.into_domain()).await?;
    Ok(Json(updated.into()))
}

/// Deletes the book if it hasn't already been started, i.e. there are no
/// associated reading sessions.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = i64, Path, description = "The id of the book to delete")),
    responses(
        (status = 200, description = "Book was successfully deleted"),
        (status = 404, description = "Book was not found"),
        (status = 422, description = "Book had already been started")
    )
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.books.delete_book(id).await?;
    Ok(StatusCode::OK)
}

//=========================================================================================
// Reading Session Handlers
//=========================================================================================

/// Creates a reading session where you have read the provided number of
/// pages on the current day. Multiple sessions can be recorded per day.
#[utoipa::path(
    post,
    path = "/reading-session/pages/{number_of_pages}",
    params(("number_of_pages" = i32, Path, description = "The number of full pages read; 0 or more")),
    responses(
        (status = 201, description = "Successfully created a reading session", body = ReadingSessionResponse),
        (status = 400, description = "The number of pages was less than 0")
    )
)]
pub async fn record_pages_handler(
    State(state): State<Arc<AppState>>,
    Path(number_of_pages): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let session = state.reading_sessions.record_pages(number_of_pages).await?;
    Ok((StatusCode::CREATED, Json(ReadingSessionResponse::from(session))))
}

/// Returns the number of pages read today, from the server clock's local day.
#[utoipa::path(
    get,
    path = "/reading-session/pages",
    responses((status = 200, description = "The number of pages read today; 0 if none were recorded", body = i32))
)]
pub async fn get_pages_read_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<i32>> {
    let total = state
        .reading_sessions
        .get_number_of_pages_read(state.clock.now())
        .await?;
    Ok(Json(total))
}

/// Saves the page number the reader finished on and derives the number of
/// pages read since the last recorded session.
#[utoipa::path(
    post,
    path = "/reading-session/finished-at/{page_number}",
    params(("page_number" = i32, Path, description = "The page the reader finished on")),
    responses(
        (status = 201, description = "Successfully created a reading session", body = ReadingSessionResponse),
        (status = 400, description = "The page number was less than the last recorded page, or less than 1")
    )
)]
pub async fn record_finished_at_handler(
    State(state): State<Arc<AppState>>,
    Path(page_number): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .reading_sessions
        .record_finished_at(page_number)
        .await?;
    Ok((StatusCode::CREATED, Json(ReadingSessionResponse::from(session))))
}
