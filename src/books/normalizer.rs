//! # Record Normalizer
//!
//! Maps a loosely typed stored document onto the strict [`Book`] shape.
//! Missing optional fields become `None`; a missing or mistyped required
//! field means the store holds something it never should have, which is
//! reported as an internal error.

use serde_json::Value;
use thiserror::Error;

use crate::store::{Document, RawDocument};

use super::model::{Book, AUTHOR, DESCRIPTION, GENRE, PUBLISHED_YEAR, TITLE};

/// Stored document violates the record shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record {id} is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("record {id} has field '{field}' of the wrong type (expected {expected})")]
    WrongType {
        id: String,
        field: &'static str,
        expected: &'static str,
    },
}

/// Normalize one stored document
pub fn normalize(doc: &RawDocument) -> Result<Book, NormalizeError> {
    let id = doc.id.to_string();
    let fields = FieldReader {
        id: &id,
        fields: &doc.fields,
    };

    Ok(Book {
        title: fields.required_text(TITLE)?,
        author: fields.required_text(AUTHOR)?,
        published_year: fields.required_integer(PUBLISHED_YEAR)?,
        genre: fields.optional_text(GENRE)?,
        description: fields.optional_text(DESCRIPTION)?,
        id,
    })
}

/// Normalize a result set, failing on the first bad document
pub fn normalize_all(docs: &[RawDocument]) -> Result<Vec<Book>, NormalizeError> {
    docs.iter().map(normalize).collect()
}

struct FieldReader<'a> {
    id: &'a str,
    fields: &'a Document,
}

impl FieldReader<'_> {
    fn missing(&self, field: &'static str) -> NormalizeError {
        NormalizeError::MissingField {
            id: self.id.to_string(),
            field,
        }
    }

    fn wrong_type(&self, field: &'static str, expected: &'static str) -> NormalizeError {
        NormalizeError::WrongType {
            id: self.id.to_string(),
            field,
            expected,
        }
    }

    fn required_text(&self, field: &'static str) -> Result<String, NormalizeError> {
        self.optional_text(field)?.ok_or_else(|| self.missing(field))
    }

    fn required_integer(&self, field: &'static str) -> Result<i64, NormalizeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| self.wrong_type(field, "integer")),
        }
    }

    fn optional_text(&self, field: &'static str) -> Result<Option<String>, NormalizeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.wrong_type(field, "string")),
        }
    }
}
