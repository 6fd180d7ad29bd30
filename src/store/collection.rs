//! # Document Collection
//!
//! In-process implementation of [`BookStore`].
//!
//! Documents live in insertion order behind a `RwLock`. When opened with a data
//! file, every mutation rewrites the file (temp file + fsync + rename) before
//! the call returns; a failed write rolls the in-memory change back.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::errors::{StoreError, StoreResult};
use super::id::RecordId;
use super::query::{Filter, Page, SortSpec, ID_FIELD};
use super::{BookStore, Document, RawDocument};

/// Collection of documents, optionally mirrored to a JSON file
pub struct DocumentCollection {
    documents: RwLock<Vec<RawDocument>>,
    data_file: Option<PathBuf>,
}

impl DocumentCollection {
    /// Create an empty collection that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            data_file: None,
        }
    }

    /// Open a file-backed collection, loading existing documents if the file exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let documents = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<RawDocument>>(&content).map_err(|e| {
                    StoreError::Corrupt {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                })?
            }
        } else {
            Vec::new()
        };

        info!(path = %path.display(), documents = documents.len(), "opened document collection");

        Ok(Self {
            documents: RwLock::new(documents),
            data_file: Some(path),
        })
    }

    /// Number of stored documents
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<RawDocument>>> {
        self.documents.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<RawDocument>>> {
        self.documents.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Write the whole collection to the data file
    fn persist(&self, documents: &[RawDocument]) -> StoreResult<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(documents).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let tmp_path = path.with_extension("tmp");
        let mut file = File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))
    }
}

impl BookStore for DocumentCollection {
    fn insert(&self, mut fields: Document) -> StoreResult<RecordId> {
        fields.remove(ID_FIELD);
        let id = RecordId::generate();

        let mut documents = self.write()?;
        documents.push(RawDocument::new(id, fields));

        if let Err(e) = self.persist(&documents) {
            documents.pop();
            return Err(e);
        }

        debug!(%id, "inserted document");
        Ok(id)
    }

    fn find_one(&self, id: &RecordId) -> StoreResult<Option<RawDocument>> {
        let documents = self.read()?;
        Ok(documents.iter().find(|d| d.id == *id).cloned())
    }

    fn find(
        &self,
        filter: &Filter,
        sort: Option<&SortSpec>,
        page: Page,
    ) -> StoreResult<Vec<RawDocument>> {
        if page.skip < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "skip must be non-negative, got {}",
                page.skip
            )));
        }

        let documents = self.read()?;
        let mut matched: Vec<&RawDocument> = documents
            .iter()
            .filter(|d| filter.matches(&d.fields))
            .collect();

        if let Some(sort) = sort {
            // Stable: ties keep insertion order
            matched.sort_by(|a, b| sort.compare_stored(a, b));
        }

        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let take = page.effective_limit().unwrap_or(usize::MAX);

        Ok(matched.into_iter().skip(skip).take(take).cloned().collect())
    }

    fn update_one(&self, id: &RecordId, mut fields: Document) -> StoreResult<u64> {
        fields.remove(ID_FIELD);

        let mut documents = self.write()?;
        let Some(index) = documents.iter().position(|d| d.id == *id) else {
            return Ok(0);
        };

        let changed: Document = fields
            .into_iter()
            .filter(|(k, v)| documents[index].fields.get(k) != Some(v))
            .collect();
        if changed.is_empty() {
            return Ok(0);
        }

        let previous = documents[index].fields.clone();
        documents[index].fields.extend(changed);

        if let Err(e) = self.persist(&documents) {
            documents[index].fields = previous;
            return Err(e);
        }

        debug!(%id, "updated document");
        Ok(1)
    }

    fn delete_one(&self, id: &RecordId) -> StoreResult<u64> {
        let mut documents = self.write()?;
        let Some(index) = documents.iter().position(|d| d.id == *id) else {
            return Ok(0);
        };

        let removed = documents.remove(index);

        if let Err(e) = self.persist(&documents) {
            documents.insert(index, removed);
            return Err(e);
        }

        debug!(%id, "deleted document");
        Ok(1)
    }

    fn close(&self) -> StoreResult<()> {
        let documents = self.read()?;
        self.persist(&documents)?;
        if let Some(path) = &self.data_file {
            info!(path = %path.display(), documents = documents.len(), "closed document collection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::query::{Condition, SortDirection};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn seeded() -> (DocumentCollection, Vec<RecordId>) {
        let coll = DocumentCollection::in_memory();
        let ids = [("Dune", 1965), ("Emma", 1815), ("Beloved", 1987), ("Carrie", 1974)]
            .into_iter()
            .map(|(title, year)| {
                coll.insert(doc(json!({"title": title, "published_year": year})))
                    .unwrap()
            })
            .collect();
        (coll, ids)
    }

    fn titles(docs: &[RawDocument]) -> Vec<&str> {
        docs.iter()
            .map(|d| d.fields["title"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_insert_and_find_one() {
        let coll = DocumentCollection::in_memory();
        let id = coll.insert(doc(json!({"title": "Dune"}))).unwrap();

        let found = coll.find_one(&id).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.fields["title"], "Dune");

        assert!(coll.find_one(&RecordId::generate()).unwrap().is_none());
    }

    #[test]
    fn test_insert_ignores_caller_id() {
        let coll = DocumentCollection::in_memory();
        let id = coll
            .insert(doc(json!({"_id": "mine", "title": "Dune"})))
            .unwrap();

        let found = coll.find_one(&id).unwrap().unwrap();
        assert!(!found.fields.contains_key("_id"));
    }

    #[test]
    fn test_find_sorted_and_paged() {
        let (coll, _) = seeded();

        let sort = SortSpec::ascending("title");
        let all = coll.find(&Filter::match_all(), Some(&sort), Page::new(0, 10)).unwrap();
        assert_eq!(titles(&all), vec!["Beloved", "Carrie", "Dune", "Emma"]);

        let page = coll.find(&Filter::match_all(), Some(&sort), Page::new(1, 2)).unwrap();
        assert_eq!(titles(&page), vec!["Carrie", "Dune"]);

        let by_year = SortSpec::new("published_year", SortDirection::Descending);
        let newest = coll.find(&Filter::match_all(), Some(&by_year), Page::new(0, 1)).unwrap();
        assert_eq!(titles(&newest), vec!["Beloved"]);
    }

    #[test]
    fn test_find_unknown_sort_field_keeps_insertion_order() {
        let (coll, _) = seeded();
        let sort = SortSpec::ascending("no_such_field");
        let all = coll.find(&Filter::match_all(), Some(&sort), Page::unbounded()).unwrap();
        assert_eq!(titles(&all), vec!["Dune", "Emma", "Beloved", "Carrie"]);
    }

    #[test]
    fn test_find_sorted_by_id_follows_creation_order() {
        let coll = DocumentCollection::in_memory();
        let a = coll.insert(doc(json!({"title": "A"}))).unwrap();
        let b = coll.insert(doc(json!({"title": "B"}))).unwrap();
        let all = Filter::match_all();

        let newest = SortSpec::new("_id", SortDirection::Descending);
        let got: Vec<RecordId> = coll
            .find(&all, Some(&newest), Page::unbounded())
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(got, vec![b, a]);

        let oldest = SortSpec::ascending("_id");
        let got = coll.find(&all, Some(&oldest), Page::unbounded()).unwrap();
        assert_eq!(titles(&got), vec!["A", "B"]);
    }

    #[test]
    fn test_find_limit_semantics() {
        let (coll, _) = seeded();
        let all = Filter::match_all();

        assert_eq!(coll.find(&all, None, Page::new(0, 0)).unwrap().len(), 4);
        assert_eq!(coll.find(&all, None, Page::new(0, -2)).unwrap().len(), 2);
        assert!(coll.find(&all, None, Page::new(10, 5)).unwrap().is_empty());

        let err = coll.find(&all, None, Page::new(-1, 5)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_find_with_filter() {
        let (coll, _) = seeded();
        let filter = Filter::match_all().and(Condition::equals("published_year", json!(1815)));
        let found = coll.find(&filter, None, Page::unbounded()).unwrap();
        assert_eq!(titles(&found), vec!["Emma"]);
    }

    #[test]
    fn test_update_modified_count() {
        let (coll, ids) = seeded();

        assert_eq!(coll.update_one(&ids[0], doc(json!({"genre": "Sci-Fi"}))).unwrap(), 1);
        assert_eq!(coll.update_one(&ids[0], doc(json!({"genre": "Sci-Fi"}))).unwrap(), 0);
        assert_eq!(coll.update_one(&ids[0], doc(json!({}))).unwrap(), 0);
        assert_eq!(
            coll.update_one(&RecordId::generate(), doc(json!({"genre": "x"}))).unwrap(),
            0
        );

        let updated = coll.find_one(&ids[0]).unwrap().unwrap();
        assert_eq!(updated.fields["genre"], "Sci-Fi");
        assert_eq!(updated.fields["title"], "Dune");
    }

    #[test]
    fn test_delete_once() {
        let (coll, ids) = seeded();
        assert_eq!(coll.delete_one(&ids[1]).unwrap(), 1);
        assert_eq!(coll.delete_one(&ids[1]).unwrap(), 0);
        assert_eq!(coll.len().unwrap(), 3);
    }

    #[test]
    fn test_file_backed_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("books.json");

        let id = {
            let coll = DocumentCollection::open(&path).unwrap();
            let id = coll.insert(doc(json!({"title": "Dune", "published_year": 1965}))).unwrap();
            coll.update_one(&id, doc(json!({"genre": "Sci-Fi"}))).unwrap();
            coll.close().unwrap();
            id
        };

        let reopened = DocumentCollection::open(&path).unwrap();
        let found = reopened.find_one(&id).unwrap().unwrap();
        assert_eq!(found.fields["title"], "Dune");
        assert_eq!(found.fields["genre"], "Sci-Fi");
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("books.json");
        fs::write(&path, "{not json").unwrap();

        let err = DocumentCollection::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("books.json");
        let coll = DocumentCollection::open(&path).unwrap();

        let err = coll.insert(doc(json!({"title": "Dune"}))).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(coll.is_empty().unwrap());
    }
}
