pub mod books;
pub mod domain;
pub mod ports;
pub mod reading_sessions;

#[cfg(test)]
mod test_support;

pub use books::BookService;
pub use domain::{Book, ReadingSession};
pub use ports::{Clock, DatabaseService, PortError, PortResult};
pub use reading_sessions::ReadingSessionService;
