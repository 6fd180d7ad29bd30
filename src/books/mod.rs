//! # Book Catalog
//!
//! Create, list, search, get, update and delete over the record store.

pub mod errors;
pub mod model;
pub mod normalizer;
pub mod query;
pub mod routes;
pub mod service;

pub use errors::{BookError, BookResult, ErrorResponse};
pub use model::{Book, BookUpdate, NewBook};
pub use normalizer::{normalize, NormalizeError};
pub use query::{build_filter, ListParams, PatternMode, SearchParams};
pub use routes::book_routes;
pub use service::{BookService, DeleteResponse};
