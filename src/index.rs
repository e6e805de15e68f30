//! Index declarations.
//!
//! An [`IndexDefinition`] names an index and lists its columns in priority
//! order. Each [`Col`] selects one field of the model and may carry a sort
//! direction, a null ordering and an operator class.
//!
//! ```
//! use indexsmith::{Col, IndexDefinition, NoField};
//!
//! let index: IndexDefinition<NoField> = IndexDefinition::new("idx_files_tenant_name")
//!     .column(Col::path("TenantID"))
//!     .column(Col::path("FileName").desc().nulls_last().class("gin_trgm_ops"))
//!     .method("gin")
//!     .extensions(["pg_trgm", "btree_gin"]);
//!
//! assert_eq!(index.columns.len(), 2);
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SynthesisError;
use crate::model::FieldToken;
use crate::tags::PIECE_SEPARATOR;

/// Sort direction of an indexed column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Asc,
    Desc,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        })
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Sort::Asc),
            "desc" => Ok(Sort::Desc),
            other => Err(format!("unknown sort direction {other:?} (expected asc or desc)")),
        }
    }
}

/// Null ordering of an indexed column, only emitted together with a [`Sort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nulls {
    First,
    Last,
}

impl fmt::Display for Nulls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Nulls::First => "first",
            Nulls::Last => "last",
        })
    }
}

impl FromStr for Nulls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Nulls::First),
            "last" => Ok(Nulls::Last),
            other => Err(format!("unknown null ordering {other:?} (expected first or last)")),
        }
    }
}

/// Which field of the model a column refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<F> {
    /// Typed field token, checked against the model's field table
    Field(F),
    /// Field named at runtime, e.g. from a declaration file
    Path(String),
}

impl<F: FieldToken> Selector<F> {
    /// Text of the selector, for error messages
    pub fn describe(&self) -> &str {
        match self {
            Selector::Field(token) => token.name(),
            Selector::Path(path) => path,
        }
    }
}

/// One column of an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Col<F> {
    pub selector: Selector<F>,
    pub sort: Option<Sort>,
    pub nulls: Option<Nulls>,
    /// Operator class, e.g. `gin_trgm_ops`
    pub op_class: Option<String>,
}

impl<F> Col<F> {
    pub fn field(token: F) -> Self {
        Self::with_selector(Selector::Field(token))
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::with_selector(Selector::Path(path.into()))
    }

    fn with_selector(selector: Selector<F>) -> Self {
        Self {
            selector,
            sort: None,
            nulls: None,
            op_class: None,
        }
    }

    pub fn asc(mut self) -> Self {
        self.sort = Some(Sort::Asc);
        self
    }

    pub fn desc(mut self) -> Self {
        self.sort = Some(Sort::Desc);
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    pub fn class(mut self, op_class: impl Into<String>) -> Self {
        self.op_class = Some(op_class.into());
        self
    }
}

/// A named composite (or single-column) index on a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition<F> {
    pub name: String,
    /// Order is priority: the first column is priority 1
    pub columns: Vec<Col<F>>,
    pub unique: bool,
    /// Partial index predicate, e.g. `deleted_at IS NULL`
    pub where_clause: Option<String>,
    /// Index method, e.g. `gin`, `gist`, `btree`
    pub method: Option<String>,
    /// Database extensions the index needs, e.g. `pg_trgm`
    pub extensions: Vec<String>,
}

impl<F> IndexDefinition<F> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            unique: false,
            where_clause: None,
            method: None,
            extensions: Vec::new(),
        }
    }

    pub fn column(mut self, column: Col<F>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Col<F>>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Check the declaration has a name and at least one column
    ///
    /// Values copied into the `orm` tag must not contain its piece separator.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        if self.name.trim().is_empty() {
            return Err(SynthesisError::malformed(&self.name, "index name is empty"));
        }
        if self.columns.is_empty() {
            return Err(SynthesisError::malformed(&self.name, "index declares no columns"));
        }
        let settings = [
            ("name", Some(self.name.as_str())),
            ("where", self.where_clause.as_deref()),
            ("type", self.method.as_deref()),
        ];
        let classes = self
            .columns
            .iter()
            .map(|col| ("operator class", col.op_class.as_deref()));
        for (setting, value) in settings.into_iter().chain(classes) {
            if value.is_some_and(|v| v.contains(PIECE_SEPARATOR)) {
                return Err(SynthesisError::malformed(
                    &self.name,
                    format!("{setting} must not contain {PIECE_SEPARATOR:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Trimmed value of an optional setting, `None` when blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::NoField;

    #[test]
    fn test_class_helper() {
        let col: Col<NoField> = Col::path("FileName");
        assert_eq!(col.op_class, None);

        let col = col.class("gin_trgm_ops");
        assert_eq!(col.op_class.as_deref(), Some("gin_trgm_ops"));
    }

    #[test]
    fn test_col_chaining() {
        let col: Col<NoField> = Col::path("FileName").desc().class("gin_trgm_ops").nulls_first();
        assert_eq!(col.sort, Some(Sort::Desc));
        assert_eq!(col.nulls, Some(Nulls::First));
        assert_eq!(col.op_class.as_deref(), Some("gin_trgm_ops"));
    }

    #[test]
    fn test_sort_and_nulls_parse() {
        assert_eq!(" DESC ".parse::<Sort>(), Ok(Sort::Desc));
        assert_eq!("asc".parse::<Sort>(), Ok(Sort::Asc));
        assert!("sideways".parse::<Sort>().is_err());
        assert_eq!("Last".parse::<Nulls>(), Ok(Nulls::Last));
        assert!("middle".parse::<Nulls>().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_declarations() {
        let no_columns: IndexDefinition<NoField> = IndexDefinition::new("idx_empty");
        assert_eq!(
            no_columns.validate().unwrap_err().kind(),
            ErrorKind::MalformedDeclaration
        );

        let no_name: IndexDefinition<NoField> = IndexDefinition::new("  ").column(Col::path("ID"));
        assert_eq!(
            no_name.validate().unwrap_err().kind(),
            ErrorKind::MalformedDeclaration
        );
    }

    #[test]
    fn test_validate_rejects_piece_separator() {
        let predicate: IndexDefinition<NoField> = IndexDefinition::new("idx_body")
            .column(Col::path("Body"))
            .filter("body <> ';'");
        let err = predicate.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeclaration);
        assert!(err.to_string().contains("where"));

        let method: IndexDefinition<NoField> = IndexDefinition::new("idx_body")
            .column(Col::path("Body"))
            .method("gin;drop");
        assert!(method.validate().is_err());

        let class: IndexDefinition<NoField> = IndexDefinition::new("idx_body")
            .column(Col::path("Title"))
            .column(Col::path("Body").class("gin_trgm_ops;x"));
        let err = class.validate().unwrap_err();
        assert!(err.to_string().contains("operator class"));

        let fine: IndexDefinition<NoField> = IndexDefinition::new("idx_body")
            .column(Col::path("Body").class("gin_trgm_ops"))
            .filter("body <> ''")
            .method("gin");
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  gin ")), Some("gin"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
