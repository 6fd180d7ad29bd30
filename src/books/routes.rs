//! # Book Routes
//!
//! Axum handlers for the `/books` endpoints.
//!
//! - `POST   /books/`          create
//! - `GET    /books/`          list (limit, skip, sort_by, order)
//! - `GET    /books/search/`   search (title, author, published_year, genre, description)
//! - `GET    /books/:id`       get
//! - `PUT    /books/:id`       update
//! - `DELETE /books/:id`       delete
//!
//! Service calls run on tokio's blocking pool: a file-backed store writes and
//! fsyncs while holding its write lock.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::errors::{BookError, BookResult};
use super::model::{Book, BookUpdate, NewBook};
use super::query::{ListParams, SearchParams};
use super::service::{BookService, DeleteResponse};

/// Shared state type
type ServiceState = State<Arc<BookService>>;

/// Build the `/books` router
pub fn book_routes(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/books", get(list_handler).post(create_handler))
        .route("/books/", get(list_handler).post(create_handler))
        .route("/books/search", get(search_handler))
        .route("/books/search/", get(search_handler))
        .route(
            "/books/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .with_state(service)
}

/// Run a service call on the blocking pool
async fn blocking<T, F>(service: Arc<BookService>, call: F) -> BookResult<T>
where
    T: Send + 'static,
    F: FnOnce(&BookService) -> BookResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| BookError::Internal(format!("book task failed: {}", e)))?
}

async fn create_handler(
    State(service): ServiceState,
    body: Result<Json<NewBook>, JsonRejection>,
) -> BookResult<(StatusCode, Json<Book>)> {
    let Json(book) = body?;
    let created = blocking(service, move |s| s.create(book)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_handler(
    State(service): ServiceState,
    query: Result<Query<ListParams>, QueryRejection>,
) -> BookResult<Json<Vec<Book>>> {
    let Query(params) = query?;
    Ok(Json(blocking(service, move |s| s.list(&params)).await?))
}

async fn search_handler(
    State(service): ServiceState,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> BookResult<Json<Vec<Book>>> {
    let Query(params) = query?;
    Ok(Json(blocking(service, move |s| s.search(&params)).await?))
}

async fn get_handler(
    State(service): ServiceState,
    Path(id): Path<String>,
) -> BookResult<Json<Book>> {
    Ok(Json(blocking(service, move |s| s.get(&id)).await?))
}

async fn update_handler(
    State(service): ServiceState,
    Path(id): Path<String>,
    body: Result<Json<BookUpdate>, JsonRejection>,
) -> BookResult<Json<Book>> {
    let Json(update) = body?;
    Ok(Json(blocking(service, move |s| s.update(&id, update)).await?))
}

async fn delete_handler(
    State(service): ServiceState,
    Path(id): Path<String>,
) -> BookResult<Json<DeleteResponse>> {
    Ok(Json(blocking(service, move |s| s.delete(&id)).await?))
}
