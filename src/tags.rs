//! Per-field metadata tags.
//!
//! A field's metadata is a set of namespaced entries (`orm`, `json`, ...).
//! The migration engine reads the [`ORM`] namespace, whose value is a
//! `;`-separated list of pieces such as `type:text;not null;index:idx_a,priority:1`.
//!
//! Entries are kept in a `BTreeMap`, so rendering is always ordered by key
//! and repeated synthesis over the same input yields identical output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Namespace read by the migration engine
pub const ORM: &str = "orm";

/// Separator between the pieces of one tag value
pub const PIECE_SEPARATOR: char = ';';

static TAG_KV: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(\w+):"([^"]*)""#).expect("valid tag regex"));

/// Metadata mapping of one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pieces of the `orm` entry, trimmed, empty pieces skipped
    pub fn orm_pieces(&self) -> impl Iterator<Item = &str> {
        pieces(self.get(ORM).unwrap_or(""))
    }

    /// Value of the first `orm` piece of the form `key:value`
    pub fn orm_setting(&self, key: &str) -> Option<&str> {
        self.orm_pieces().find_map(|piece| {
            piece
                .split_once(':')
                .filter(|(k, _)| k.trim().eq_ignore_ascii_case(key))
                .map(|(_, v)| v.trim())
        })
    }

    /// Whether the `orm` entry carries a bare flag such as `primaryKey` or `not null`
    pub fn orm_flag(&self, flag: &str) -> bool {
        self.orm_pieces().any(|piece| piece.eq_ignore_ascii_case(flag))
    }
}

/// Split a `;`-separated tag value into trimmed, non-empty pieces
pub fn pieces(value: &str) -> impl Iterator<Item = &str> {
    value.split(PIECE_SEPARATOR).map(str::trim).filter(|p| !p.is_empty())
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Tags(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}:\"{value}\"")?;
        }
        Ok(())
    }
}

impl FromStr for Tags {
    type Err = std::convert::Infallible;

    /// Parses `key:"value" key2:"value2"`; text outside that form is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TAG_KV
            .captures_iter(s)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_sorted_by_key() {
        let mut tags = Tags::new();
        tags.insert("orm", "type:text");
        tags.insert("json", "file_name");
        assert_eq!(tags.to_string(), r#"json:"file_name" orm:"type:text""#);
    }

    #[test]
    fn test_parse_inline_tags() {
        let tags: Tags = r#"orm:"column:id;primaryKey" json:"id""#.parse().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("orm"), Some("column:id;primaryKey"));
        assert_eq!(tags.get("json"), Some("id"));
        assert_eq!(tags.to_string().parse::<Tags>().unwrap(), tags);
    }

    #[test]
    fn test_orm_accessors() {
        let tags: Tags = r#"orm:"type:text; not null ;;column:file""#.parse().unwrap();
        let pieces: Vec<_> = tags.orm_pieces().collect();
        assert_eq!(pieces, vec!["type:text", "not null", "column:file"]);
        assert_eq!(tags.orm_setting("type"), Some("text"));
        assert_eq!(tags.orm_setting("column"), Some("file"));
        assert_eq!(tags.orm_setting("default"), None);
        assert!(tags.orm_flag("NOT NULL"));
        assert!(!tags.orm_flag("primaryKey"));
    }

    #[test]
    fn test_empty_tags_render_empty() {
        assert_eq!(Tags::new().to_string(), "");
        assert!("no tags here".parse::<Tags>().unwrap().is_empty());
    }
}
