//! # Record Store
//!
//! Document collection backing the book catalog.
//!
//! Documents are loosely typed JSON objects keyed by a store-assigned
//! [`RecordId`]. Callers talk to the collection only through the
//! [`BookStore`] trait, so the HTTP layer never sees how documents are held.

pub mod collection;
pub mod errors;
pub mod id;
pub mod query;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use collection::DocumentCollection;
pub use errors::{StoreError, StoreResult};
pub use id::{InvalidRecordId, RecordId};
pub use query::{Condition, Filter, Page, Predicate, SortDirection, SortSpec};

/// Field set of a stored document (everything except the identifier)
pub type Document = Map<String, Value>;

/// A document as it sits in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "_id")]
    pub id: RecordId,

    #[serde(flatten)]
    pub fields: Document,
}

impl RawDocument {
    pub fn new(id: RecordId, fields: Document) -> Self {
        Self { id, fields }
    }
}

/// Operations the catalog needs from a document store.
///
/// Every operation touches at most one document, except `find`. Single
/// document operations are atomic with respect to each other.
pub trait BookStore: Send + Sync {
    /// Insert a new document and return the identifier the store assigned
    fn insert(&self, fields: Document) -> StoreResult<RecordId>;

    /// Fetch one document by identifier
    fn find_one(&self, id: &RecordId) -> StoreResult<Option<RawDocument>>;

    /// Fetch every document matching `filter`, optionally sorted, then paged
    fn find(
        &self,
        filter: &Filter,
        sort: Option<&SortSpec>,
        page: Page,
    ) -> StoreResult<Vec<RawDocument>>;

    /// Overwrite the given fields of one document.
    ///
    /// Returns the modified count: 0 when the document is absent or when every
    /// supplied value already equals the stored one.
    fn update_one(&self, id: &RecordId, fields: Document) -> StoreResult<u64>;

    /// Delete one document, returning the deleted count
    fn delete_one(&self, id: &RecordId) -> StoreResult<u64>;

    /// Release the store at shutdown
    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
