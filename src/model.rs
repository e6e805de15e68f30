//! Runtime description of a model's shape
//!
//! [`ModelSchema`] is what the migration engine consumes: the model's fields in
//! declaration order with their declared types and metadata tags. It is built
//! either by `#[derive(IndexedModel)]` or by hand (and by the declaration-file
//! loader), and synthesis produces a metadata-augmented copy of it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::index::IndexDefinition;
use crate::tags::Tags;

/// A typed reference to one field of a model
///
/// Usually an enum with one variant per field, generated by the derive.
/// `name` returns the canonical field identifier as it appears in the model's
/// [`ModelSchema`].
pub trait FieldToken: Copy + fmt::Debug {
    fn name(&self) -> &'static str;
}

/// Field token for models described only at runtime (no typed fields)
///
/// Declarations using it can only select columns with [`crate::Selector::Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoField {}

impl FieldToken for NoField {
    fn name(&self) -> &'static str {
        match *self {}
    }
}

/// Shape of the type behind a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Record with named fields, the only shape that maps to a table
    Struct,
    TupleStruct,
    Enum,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::Struct => "struct",
            ModelKind::TupleStruct => "tuple struct",
            ModelKind::Enum => "enum",
        })
    }
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Canonical identifier (e.g. `TenantID`)
    pub name: String,
    /// Declared type, as written in the model (e.g. `Option<String>`)
    pub ty: String,
    /// Externally visible fields are the only ones that carry columns
    pub visible: bool,
    /// Field embeds another record's columns
    pub embedded: bool,
    /// Derived value with no stored column
    pub computed: bool,
    pub tags: Tags,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visible: true,
            embedded: false,
            computed: false,
            tags: Tags::new(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

/// Structural description of a model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSchema {
    /// Type name of the model (e.g. `NotebookFile`)
    pub name: String,
    pub kind: ModelKind,
    pub fields: Vec<FieldSchema>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Struct,
            fields: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a top-level field by its canonical name
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.visible)
    }
}

/// A model that can declare composite indexes
///
/// Implemented by `#[derive(IndexedModel)]`. Models that don't override
/// [`IndexedModel::indexes`] are migrated unchanged.
///
/// Only structs with named fields can be models:
///
/// ```compile_fail
/// #[derive(indexsmith::IndexedModel)]
/// pub enum Status {
///     Active,
///     Archived,
/// }
/// ```
pub trait IndexedModel {
    type Field: FieldToken;

    /// Shape of the model type
    fn schema() -> ModelSchema;

    /// Persisted-entity (table) name, if the model declares one
    fn table_name(&self) -> Option<String> {
        None
    }

    /// Index declarations of the model
    fn indexes(&self) -> Vec<IndexDefinition<Self::Field>> {
        Vec::new()
    }
}
