//! Model declaration files.
//!
//! Describes models and their indexes in TOML, for schemas that are not
//! compiled into the tool:
//!
//! ```toml
//! [[model]]
//! name = "NotebookFile"
//! table_name = "notebook_files"
//!
//! [[model.field]]
//! name = "TenantID"
//! type = "String"
//! tags = { orm = "type:text;not null" }
//!
//! [[model.index]]
//! name = "idx_notebook_files_tenant"
//! columns = [{ field = "TenantID", sort = "desc" }]
//! extensions = ["btree_gin"]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;

use indexsmith::{
    Col, FieldSchema, IndexDefinition, ModelKind, ModelSchema, NoField, Nulls, Sort,
    SynthesisError, Tags,
};

/// Top level of a declaration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarationFile {
    #[serde(default, rename = "model")]
    pub models: Vec<ModelDeclaration>,
}

impl DeclarationFile {
    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDeclaration {
    pub name: String,
    pub table_name: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: ModelKind,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default, rename = "index")]
    pub indexes: Vec<IndexDeclaration>,
}

fn default_kind() -> ModelKind {
    ModelKind::Struct
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDeclaration {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDeclaration>,
    #[serde(default)]
    pub unique: bool,
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    #[serde(rename = "type")]
    pub method: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDeclaration {
    pub field: String,
    pub sort: Option<String>,
    pub nulls: Option<String>,
    pub class: Option<String>,
}

impl ModelDeclaration {
    /// Runtime schema of the declared model
    pub fn schema(&self) -> ModelSchema {
        let fields = self.fields.iter().map(|field| {
            let mut schema = FieldSchema::new(&field.name, &field.ty)
                .tags(Tags::from(field.tags.clone()));
            schema.visible = field.visible;
            schema.embedded = field.embedded;
            schema.computed = field.computed;
            schema
        });
        fields.fold(ModelSchema::new(&self.name).kind(self.kind), ModelSchema::field)
    }

    /// Index declarations with columns selected by path
    pub fn index_definitions(&self) -> Result<Vec<IndexDefinition<NoField>>, SynthesisError> {
        self.indexes.iter().map(IndexDeclaration::to_definition).collect()
    }
}

impl IndexDeclaration {
    fn to_definition(&self) -> Result<IndexDefinition<NoField>, SynthesisError> {
        let mut index = IndexDefinition::new(&self.name).extensions(self.extensions.iter().cloned());
        for column in &self.columns {
            index = index.column(column.to_col(&self.name)?);
        }
        if self.unique {
            index = index.unique();
        }
        if let Some(predicate) = &self.where_clause {
            index = index.filter(predicate);
        }
        if let Some(method) = &self.method {
            index = index.method(method);
        }
        Ok(index)
    }
}

impl ColumnDeclaration {
    fn to_col(&self, index: &str) -> Result<Col<NoField>, SynthesisError> {
        let malformed = |reason: String| SynthesisError::MalformedDeclaration {
            index: index.to_string(),
            reason,
        };
        let mut col = Col::path(&self.field);
        if let Some(sort) = &self.sort {
            col.sort = Some(sort.parse::<Sort>().map_err(malformed)?);
        }
        if let Some(nulls) = &self.nulls {
            col.nulls = Some(nulls.parse::<Nulls>().map_err(malformed)?);
        }
        if let Some(class) = &self.class {
            col = col.class(class);
        }
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexsmith::ErrorKind;

    const NOTEBOOK: &str = r#"
[[model]]
name = "NotebookFile"
table_name = "notebook_files"

[[model.field]]
name = "ID"
type = "u32"
tags = { orm = "primaryKey" }

[[model.field]]
name = "FileName"
type = "String"
tags = { orm = "type:text;not null", json = "file_name" }

[[model.field]]
name = "cache"
type = "Vec<u8>"
visible = false

[[model.index]]
name = "idx_notebook_files_name"
columns = [{ field = "FileName", sort = "DESC", nulls = "last", class = "gin_trgm_ops" }]
type = "gin"
where = "file_name <> ''"
extensions = ["pg_trgm"]
"#;

    #[test]
    fn test_parse_model() {
        let file = DeclarationFile::parse(NOTEBOOK).unwrap();
        assert_eq!(file.models.len(), 1);
        let model = &file.models[0];
        assert_eq!(model.table_name.as_deref(), Some("notebook_files"));
        assert_eq!(model.kind, ModelKind::Struct);

        let schema = model.schema();
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.get("FileName").unwrap().tags.get("json"), Some("file_name"));
        assert!(!schema.get("cache").unwrap().visible);
    }

    #[test]
    fn test_index_definitions() {
        let file = DeclarationFile::parse(NOTEBOOK).unwrap();
        let indexes = file.models[0].index_definitions().unwrap();
        assert_eq!(indexes.len(), 1);

        let index = &indexes[0];
        assert_eq!(index.method.as_deref(), Some("gin"));
        assert_eq!(index.where_clause.as_deref(), Some("file_name <> ''"));
        assert_eq!(index.extensions, vec!["pg_trgm"]);
        assert_eq!(index.columns[0].sort, Some(Sort::Desc));
        assert_eq!(index.columns[0].nulls, Some(Nulls::Last));
        assert_eq!(index.columns[0].op_class.as_deref(), Some("gin_trgm_ops"));
    }

    #[test]
    fn test_unknown_sort_is_malformed() {
        let source = r#"
[[model]]
name = "File"

[[model.field]]
name = "Name"
type = "String"

[[model.index]]
name = "idx_files_name"
columns = [{ field = "Name", sort = "sideways" }]
"#;
        let file = DeclarationFile::parse(source).unwrap();
        let err = file.models[0].index_definitions().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeclaration);
        assert!(err.to_string().contains("idx_files_name"));
    }

    #[test]
    fn test_kind_is_parsed() {
        let source = "[[model]]\nname = \"Status\"\nkind = \"enum\"\n";
        let file = DeclarationFile::parse(source).unwrap();
        assert_eq!(file.models[0].kind, ModelKind::Enum);
        assert!(file.models[0].fields.is_empty());
    }
}
