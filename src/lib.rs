//! bookshelf - A small book catalog service
//!
//! CRUD, multi-field search and sorted, paginated listing of book records
//! held in a document collection, served over HTTP.

pub mod books;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod logging;
pub mod store;
