//! # Query Builder
//!
//! Turns request parameters into store queries.
//!
//! Search filters come from a fixed table of `(field, predicate kind)` pairs;
//! a condition is added for each field the caller supplied. List requests
//! become a sort specification plus a page.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::config::SearchConfig;
use crate::store::{Condition, Filter, Page, SortDirection, SortSpec};

use super::errors::{BookError, BookResult};
use super::model::{AUTHOR, DESCRIPTION, GENRE, PUBLISHED_YEAR, TITLE};

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_SORT_FIELD: &str = "title";
pub const DEFAULT_ORDER: &str = "asc";

/// How a search field is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Case-insensitive substring/pattern search
    Substring,
    /// Exact equality
    Exact,
}

/// Searchable fields, in the order their conditions are built
pub const SEARCH_FIELDS: [(&str, PredicateKind); 5] = [
    (TITLE, PredicateKind::Substring),
    (AUTHOR, PredicateKind::Substring),
    (PUBLISHED_YEAR, PredicateKind::Exact),
    (GENRE, PredicateKind::Substring),
    (DESCRIPTION, PredicateKind::Substring),
];

/// Treatment of caller-supplied search text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternMode {
    /// Text is a regular expression (metacharacters are live)
    #[default]
    Regex,
    /// Text is escaped and matched literally
    Literal,
}

impl From<&SearchConfig> for PatternMode {
    fn from(config: &SearchConfig) -> Self {
        if config.literal_text {
            PatternMode::Literal
        } else {
            PatternMode::Regex
        }
    }
}

/// Query string of `GET /books/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub limit: i64,
    pub skip: i64,
    pub sort_by: String,
    pub order: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
            sort_by: DEFAULT_SORT_FIELD.to_string(),
            order: DEFAULT_ORDER.to_string(),
        }
    }
}

impl ListParams {
    pub fn sort(&self) -> SortSpec {
        SortSpec::new(self.sort_by.clone(), SortDirection::from_token(&self.order))
    }

    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Query string of `GET /books/search/`. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub published_year: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
}

impl SearchParams {
    fn text(&self, field: &str) -> Option<&str> {
        match field {
            TITLE => self.title.as_deref(),
            AUTHOR => self.author.as_deref(),
            GENRE => self.genre.as_deref(),
            DESCRIPTION => self.description.as_deref(),
            _ => None,
        }
    }

    fn exact(&self, field: &str) -> Option<Value> {
        match field {
            PUBLISHED_YEAR => self.published_year.map(Value::from),
            _ => None,
        }
    }
}

/// Build the search filter; no parameters yields a match-all filter
pub fn build_filter(params: &SearchParams, mode: PatternMode) -> BookResult<Filter> {
    let mut filter = Filter::match_all();

    for (field, kind) in SEARCH_FIELDS {
        let condition = match kind {
            PredicateKind::Substring => match params.text(field) {
                Some(text) if !text.is_empty() => {
                    Condition::pattern(field, compile_pattern(field, text, mode)?)
                }
                _ => continue,
            },
            PredicateKind::Exact => match params.exact(field) {
                Some(value) => Condition::equals(field, value),
                None => continue,
            },
        };
        filter.push(condition);
    }

    Ok(filter)
}

fn compile_pattern(field: &str, text: &str, mode: PatternMode) -> BookResult<Regex> {
    let pattern = match mode {
        PatternMode::Regex => text.to_string(),
        PatternMode::Literal => regex::escape(text),
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| BookError::InvalidFilter(format!("{}: {}", field, e)))
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Predicate;
    use serde_json::json;

    fn params(title: Option<&str>, year: Option<i64>) -> SearchParams {
        SearchParams {
            title: title.map(String::from),
            published_year: year,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_params_match_all() {
        let filter = build_filter(&SearchParams::default(), PatternMode::Regex).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_conditions_follow_field_table() {
        let search = SearchParams {
            description: Some("spice".into()),
            published_year: Some(1965),
            title: Some("dune".into()),
            ..Default::default()
        };
        let filter = build_filter(&search, PatternMode::Regex).unwrap();

        let fields: Vec<&str> = filter.conditions().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "published_year", "description"]);

        match &filter.conditions()[1].predicate {
            Predicate::Equals(v) => assert_eq!(v, &json!(1965)),
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let filter = build_filter(&params(Some("alchemist"), None), PatternMode::Regex).unwrap();
        let doc = json!({"title": "The Alchemist"}).as_object().cloned().unwrap();
        assert!(filter.matches(&doc));
    }

    #[test]
    fn test_regex_mode_keeps_metacharacters() {
        let filter = build_filter(&params(Some("^the"), None), PatternMode::Regex).unwrap();
        let hit = json!({"title": "The Alchemist"}).as_object().cloned().unwrap();
        let miss = json!({"title": "Breathe"}).as_object().cloned().unwrap();
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn test_literal_mode_escapes() {
        let filter = build_filter(&params(Some("c++"), None), PatternMode::Literal).unwrap();
        let hit = json!({"title": "Learning C++"}).as_object().cloned().unwrap();
        let miss = json!({"title": "Learning C"}).as_object().cloned().unwrap();
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn test_invalid_pattern_is_filter_error() {
        let err = build_filter(&params(Some("(unclosed"), None), PatternMode::Regex).unwrap_err();
        assert!(matches!(err, BookError::InvalidFilter(_)));
    }

    #[test]
    fn test_lookaround_and_backreferences_are_filter_errors() {
        for pattern in ["(?=dune)", "(?<!the )dune", r"(a)\1"] {
            let err = build_filter(&params(Some(pattern), None), PatternMode::Regex).unwrap_err();
            assert!(matches!(err, BookError::InvalidFilter(_)), "{}", pattern);
        }
        // Literal mode escapes the same text instead of rejecting it
        assert!(build_filter(&params(Some("(?=dune)"), None), PatternMode::Literal).is_ok());
    }

    #[test]
    fn test_empty_query_values_are_absent() {
        let search: SearchParams =
            serde_json::from_value(json!({"title": "", "published_year": "", "genre": "Fic"})).unwrap();
        assert_eq!(search.title, None);
        assert_eq!(search.published_year, None);
        assert_eq!(search.genre.as_deref(), Some("Fic"));

        let bad = serde_json::from_value::<SearchParams>(json!({"published_year": "soon"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_list_defaults() {
        let list = ListParams::default();
        assert_eq!(list.sort(), SortSpec::ascending("title"));
        assert_eq!(list.page(), Page::new(0, 10));

        let desc = ListParams {
            order: "desc".into(),
            sort_by: "published_year".into(),
            ..Default::default()
        };
        assert_eq!(desc.sort().direction, SortDirection::Descending);
        assert_eq!(desc.sort().field, "published_year");
    }
}
