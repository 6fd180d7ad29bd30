//! # Book Records
//!
//! Public record shape and the request bodies that create or change it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

use super::errors::{BookError, BookResult};

pub const TITLE: &str = "title";
pub const AUTHOR: &str = "author";
pub const PUBLISHED_YEAR: &str = "published_year";
pub const GENRE: &str = "genre";
pub const DESCRIPTION: &str = "description";

/// A book as returned by the API.
///
/// `genre` and `description` serialize as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub published_year: i64,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// Body of a create request. Any `id` the caller sends is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: i64,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, published_year: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_year,
            genre: None,
            description: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reject empty required text fields
    pub fn validate(&self) -> BookResult<()> {
        require_text(TITLE, &self.title)?;
        require_text(AUTHOR, &self.author)
    }

    /// Document to insert. Absent optional fields are left out entirely.
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert(TITLE.to_string(), Value::String(self.title));
        doc.insert(AUTHOR.to_string(), Value::String(self.author));
        doc.insert(PUBLISHED_YEAR.to_string(), Value::from(self.published_year));
        if let Some(genre) = self.genre {
            doc.insert(GENRE.to_string(), Value::String(genre));
        }
        if let Some(description) = self.description {
            doc.insert(DESCRIPTION.to_string(), Value::String(description));
        }
        doc
    }
}

/// Body of an update request; only present fields are written.
/// `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_year: Option<i64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.published_year.is_none()
            && self.genre.is_none()
            && self.description.is_none()
    }

    /// Validate each supplied field on its own
    pub fn validate(&self) -> BookResult<()> {
        if let Some(title) = &self.title {
            require_text(TITLE, title)?;
        }
        if let Some(author) = &self.author {
            require_text(AUTHOR, author)?;
        }
        Ok(())
    }

    /// The `$set`-style field map for the store
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        let text_fields = [
            (TITLE, self.title),
            (AUTHOR, self.author),
            (GENRE, self.genre),
            (DESCRIPTION, self.description),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                doc.insert(field.to_string(), Value::String(value));
            }
        }
        if let Some(year) = self.published_year {
            doc.insert(PUBLISHED_YEAR.to_string(), Value::from(year));
        }
        doc
    }
}

fn require_text(field: &str, value: &str) -> BookResult<()> {
    if value.trim().is_empty() {
        return Err(BookError::InvalidBody(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_book_document_omits_absent_optionals() {
        let doc = NewBook::new("Dune", "Herbert", 1965).into_document();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc[PUBLISHED_YEAR], json!(1965));
        assert!(!doc.contains_key(GENRE));
    }

    #[test]
    fn test_new_book_ignores_id_in_body() {
        let book: NewBook = serde_json::from_value(json!({
            "id": "abc",
            "title": "Dune",
            "author": "Herbert",
            "published_year": 1965
        }))
        .unwrap();
        assert_eq!(book, NewBook::new("Dune", "Herbert", 1965));
    }

    #[test]
    fn test_new_book_requires_fields() {
        let missing = serde_json::from_value::<NewBook>(json!({"title": "Dune", "author": "Herbert"}));
        assert!(missing.is_err());

        let blank = NewBook::new("  ", "Herbert", 1965);
        assert!(matches!(blank.validate(), Err(BookError::InvalidBody(_))));
    }

    #[test]
    fn test_update_treats_null_as_absent() {
        let update: BookUpdate =
            serde_json::from_value(json!({"genre": "Sci-Fi", "title": null})).unwrap();
        let doc = update.into_document();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc[GENRE], "Sci-Fi");
    }

    #[test]
    fn test_update_validation() {
        let update = BookUpdate {
            author: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(BookUpdate::default().is_empty());
        assert!(BookUpdate::default().validate().is_ok());
    }
}
