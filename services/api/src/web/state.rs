//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use page_tracker_core::ports::Clock;
use page_tracker_core::{BookService, ReadingSessionService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub books: BookService,
    pub reading_sessions: ReadingSessionService,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}
