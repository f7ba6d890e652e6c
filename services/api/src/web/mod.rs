pub mod rest;
pub mod state;

// Re-export the router and OpenAPI document for the binary that builds the
// web server.
pub use rest::{api_router, ApiDoc};
