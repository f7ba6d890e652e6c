//! services/api/src/bin/openapi.rs
//!
//! Prints the OpenAPI document to stdout, for generating client code or
//! committing a spec snapshot.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
