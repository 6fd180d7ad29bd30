//! # Book Service
//!
//! The six catalog operations, composed from the query builder, the store and
//! the normalizer. Each operation issues at most two store calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::store::{BookStore, Filter, Page, RecordId};

use super::errors::{BookError, BookResult};
use super::model::{Book, BookUpdate, NewBook};
use super::normalizer::{normalize, normalize_all};
use super::query::{build_filter, ListParams, PatternMode, SearchParams};

/// Confirmation returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self {
            message: "Book deleted successfully".to_string(),
        }
    }
}

/// Catalog operations over an injected store
pub struct BookService {
    store: Arc<dyn BookStore>,
    pattern_mode: PatternMode,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, search: &SearchConfig) -> Self {
        Self {
            store,
            pattern_mode: PatternMode::from(search),
        }
    }

    /// Insert a book and return it as stored, with its new id
    pub fn create(&self, book: NewBook) -> BookResult<Book> {
        book.validate()?;

        let id = self.store.insert(book.into_document())?;
        info!(%id, "created book");

        let doc = self
            .store
            .find_one(&id)?
            .ok_or_else(|| BookError::Internal(format!("book {} vanished after insert", id)))?;
        Ok(normalize(&doc)?)
    }

    /// One sorted page of books; an empty page is not an error
    pub fn list(&self, params: &ListParams) -> BookResult<Vec<Book>> {
        let sort = params.sort();
        let page = params.page();
        debug!(sort_by = %sort.field, direction = ?sort.direction, skip = page.skip, limit = page.limit, "listing books");

        let docs = self.store.find(&Filter::match_all(), Some(&sort), page)?;
        Ok(normalize_all(&docs)?)
    }

    /// Books matching every supplied filter. Zero matches is reported as
    /// [`BookError::NoMatches`].
    pub fn search(&self, params: &SearchParams) -> BookResult<Vec<Book>> {
        let filter = build_filter(params, self.pattern_mode)?;
        debug!(conditions = filter.conditions().len(), "searching books");

        let docs = self.store.find(&filter, None, Page::unbounded())?;
        if docs.is_empty() {
            return Err(BookError::NoMatches);
        }
        Ok(normalize_all(&docs)?)
    }

    pub fn get(&self, id: &str) -> BookResult<Book> {
        let id: RecordId = id.parse()?;
        let doc = self
            .store
            .find_one(&id)?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        Ok(normalize(&doc)?)
    }

    /// Apply the supplied fields and return the re-fetched record.
    ///
    /// A zero modified count (absent record, or nothing actually changed) is
    /// reported as [`BookError::NotFoundOrUnchanged`].
    pub fn update(&self, id: &str, update: BookUpdate) -> BookResult<Book> {
        let id: RecordId = id.parse()?;
        update.validate()?;

        let modified = self.store.update_one(&id, update.into_document())?;
        if modified == 0 {
            return Err(BookError::NotFoundOrUnchanged(id.to_string()));
        }
        info!(%id, "updated book");

        let doc = self
            .store
            .find_one(&id)?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        Ok(normalize(&doc)?)
    }

    pub fn delete(&self, id: &str) -> BookResult<DeleteResponse> {
        let id: RecordId = id.parse()?;
        if self.store.delete_one(&id)? == 0 {
            return Err(BookError::NotFound(id.to_string()));
        }
        info!(%id, "deleted book");
        Ok(DeleteResponse::success())
    }
}
