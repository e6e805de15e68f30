//! Synthesis entry points.
//!
//! Turns a model and its index declarations into a [`Synthesis`]: the
//! projected schema, the persisted-entity name and the required extensions,
//! ready for a [`crate::MigrationEngine`].

use std::collections::HashSet;

use serde::Serialize;

use crate::error::SynthesisError;
use crate::extensions::required_extensions;
use crate::fragment::collect_fragments;
use crate::index::IndexDefinition;
use crate::model::{FieldToken, IndexedModel, ModelKind, ModelSchema};
use crate::projection::project;

/// Result of synthesizing one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synthesis {
    /// Schema to migrate; the original schema when nothing was declared
    pub schema: ModelSchema,
    /// Persisted-entity name declared by the model
    pub table_name: Option<String>,
    pub extensions: Vec<String>,
    /// False when the model declared no indexes and was passed through
    pub projected: bool,
}

/// Synthesize index annotations for a typed model
pub fn synthesize<M: IndexedModel>(model: &M) -> Result<Synthesis, SynthesisError> {
    let schema = M::schema();
    synthesize_schema(Some(&schema), model.table_name(), &model.indexes())
}

/// Synthesize index annotations for a model described at runtime
pub fn synthesize_schema<F: FieldToken>(
    schema: Option<&ModelSchema>,
    table_name: Option<String>,
    indexes: &[IndexDefinition<F>],
) -> Result<Synthesis, SynthesisError> {
    let schema = schema.ok_or(SynthesisError::NilModel)?;
    if schema.kind != ModelKind::Struct {
        return Err(SynthesisError::NotAStruct {
            model: schema.name.clone(),
            kind: schema.kind,
        });
    }
    let mut seen = HashSet::new();
    if let Some(dup) = schema.fields.iter().find(|f| !seen.insert(f.name.as_str())) {
        return Err(SynthesisError::DuplicateField {
            model: schema.name.clone(),
            field: dup.name.clone(),
        });
    }

    if indexes.is_empty() {
        log::trace!("{}: no index declarations, passing through", schema.name);
        return Ok(Synthesis {
            schema: schema.clone(),
            table_name,
            extensions: Vec::new(),
            projected: false,
        });
    }

    let fragments = collect_fragments(schema, indexes)?;
    log::trace!(
        "{}: {} index declaration(s) over {} field(s)",
        schema.name,
        indexes.len(),
        fragments.len()
    );
    Ok(Synthesis {
        schema: project(schema, &fragments),
        table_name,
        extensions: required_extensions(indexes),
        projected: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::index::Col;
    use crate::model::{FieldSchema, NoField};
    use crate::tags::ORM;

    #[derive(Debug, Clone, Copy)]
    enum NotebookFileField {
        TenantId,
        ScanVersion,
        FileName,
    }

    impl FieldToken for NotebookFileField {
        fn name(&self) -> &'static str {
            match self {
                NotebookFileField::TenantId => "TenantID",
                NotebookFileField::ScanVersion => "ScanVersion",
                NotebookFileField::FileName => "FileName",
            }
        }
    }

    struct NotebookFile;

    impl IndexedModel for NotebookFile {
        type Field = NotebookFileField;

        fn schema() -> ModelSchema {
            ModelSchema::new("NotebookFile")
                .field(FieldSchema::new("ID", "u32").tag(ORM, "primaryKey"))
                .field(FieldSchema::new("TenantID", "String").tag(ORM, "type:text;not null"))
                .field(FieldSchema::new("ScanVersion", "i32").tag(ORM, "not null"))
                .field(FieldSchema::new("FileName", "String").tag(ORM, "type:text;not null"))
        }

        fn table_name(&self) -> Option<String> {
            Some("notebook_files".to_string())
        }

        fn indexes(&self) -> Vec<IndexDefinition<NotebookFileField>> {
            vec![IndexDefinition::new("idx_notebook_files_tenant_scan_filename_trgm")
                .column(Col::field(NotebookFileField::TenantId))
                .column(Col::field(NotebookFileField::ScanVersion))
                .column(Col::field(NotebookFileField::FileName).class("gin_trgm_ops"))
                .method("gin")
                .extensions(["pg_trgm", "btree_gin"])]
        }
    }

    struct Plain;

    impl IndexedModel for Plain {
        type Field = NoField;

        fn schema() -> ModelSchema {
            ModelSchema::new("Plain")
                .field(FieldSchema::new("ID", "u32").tag(ORM, "index:idx_inline"))
                .field(FieldSchema::new("note", "String").hidden())
        }
    }

    #[test]
    fn test_notebook_file_end_to_end() {
        let synthesis = synthesize(&NotebookFile).unwrap();
        assert!(synthesis.projected);
        assert_eq!(synthesis.table_name.as_deref(), Some("notebook_files"));
        assert_eq!(synthesis.extensions, vec!["pg_trgm", "btree_gin"]);

        let schema = &synthesis.schema;
        let orm = |name: &str| schema.get(name).unwrap().tags.get(ORM).unwrap().to_string();
        assert_eq!(orm("ID"), "primaryKey");
        assert_eq!(
            orm("TenantID"),
            "type:text;not null;index:idx_notebook_files_tenant_scan_filename_trgm,priority:1,type:gin"
        );
        assert_eq!(
            orm("ScanVersion"),
            "not null;index:idx_notebook_files_tenant_scan_filename_trgm,priority:2"
        );
        assert_eq!(
            orm("FileName"),
            "type:text;not null;index:idx_notebook_files_tenant_scan_filename_trgm,priority:3,expression:file_name gin_trgm_ops"
        );
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        assert_eq!(synthesize(&NotebookFile).unwrap(), synthesize(&NotebookFile).unwrap());
    }

    #[test]
    fn test_no_declarations_is_passthrough() {
        let synthesis = synthesize(&Plain).unwrap();
        assert!(!synthesis.projected);
        assert_eq!(synthesis.schema, Plain::schema());
        assert!(synthesis.extensions.is_empty());
        assert_eq!(synthesis.table_name, None);
    }

    #[test]
    fn test_nil_model() {
        let err = synthesize_schema::<NoField>(None, None, &[]).unwrap_err();
        assert_eq!(err, SynthesisError::NilModel);
    }

    #[test]
    fn test_not_a_struct() {
        let schema = ModelSchema::new("Status").kind(ModelKind::Enum);
        let err = synthesize_schema::<NoField>(Some(&schema), None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAStruct);
    }

    #[test]
    fn test_selector_failure_returns_no_projection() {
        let schema = NotebookFile::schema();
        let indexes: Vec<IndexDefinition<NoField>> = vec![
            IndexDefinition::new("idx_ok").column(Col::path("FileName")),
            IndexDefinition::new("idx_bad").column(Col::path("Profile.City")),
        ];
        let err = synthesize_schema(Some(&schema), None, &indexes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorNotATopLevelField);
        assert!(err.to_string().contains("idx_bad"));
    }

    #[test]
    fn test_duplicate_field_names_are_rejected() {
        let schema = ModelSchema::new("Person")
            .field(FieldSchema::new("Name", "String"))
            .field(FieldSchema::new("Name", "String").tag(ORM, "column:last_name"));
        let indexes: Vec<IndexDefinition<NoField>> =
            vec![IndexDefinition::new("idx_last").column(Col::path("Name")).unique()];
        let err = synthesize_schema(Some(&schema), None, &indexes).unwrap_err();
        assert_eq!(
            err,
            SynthesisError::DuplicateField {
                model: "Person".to_string(),
                field: "Name".to_string(),
            }
        );
        assert_eq!(err.kind(), ErrorKind::DuplicateField);

        // Also without any index declarations
        let err = synthesize_schema::<NoField>(Some(&schema), None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateField);
    }
}
