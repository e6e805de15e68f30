//! Load model declarations and render their migration SQL.

use std::fs;
use std::path::{Path, PathBuf};

use indexsmith::{
    apply, synthesize, synthesize_schema, EngineError, IndexedModel, RecordingSink, Synthesis,
    SynthesisError,
};
use thiserror::Error;

use crate::config::MigrateConfig;
use crate::declarations::{DeclarationFile, ModelDeclaration};
use crate::sql_generator::PostgresEngine;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("model {model}: {source}")]
    Synthesis {
        model: String,
        #[source]
        source: SynthesisError,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("unsupported dialect {0:?} (only postgres is supported)")]
    UnsupportedDialect(String),
}

/// Read and parse a declaration file
pub fn read_declarations(path: impl AsRef<Path>) -> Result<DeclarationFile, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    DeclarationFile::parse(&source).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Synthesize one declared model
pub fn synthesize_declaration(model: &ModelDeclaration) -> Result<Synthesis, LoadError> {
    let wrap = |source| LoadError::Synthesis {
        model: model.name.clone(),
        source,
    };
    let indexes = model.index_definitions().map_err(wrap)?;
    synthesize_schema(Some(&model.schema()), model.table_name.clone(), &indexes).map_err(wrap)
}

/// Synthesize a compiled model
pub fn synthesize_model<M: IndexedModel>(model: &M) -> Result<Synthesis, LoadError> {
    synthesize(model).map_err(|source| LoadError::Synthesis {
        model: M::schema().name,
        source,
    })
}

/// Renders migration SQL for a batch of models
pub struct Loader {
    config: MigrateConfig,
}

impl Loader {
    pub fn new(config: MigrateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Synthesize every model of a declaration file, stopping at the first error
    pub fn synthesize_all(&self, file: &DeclarationFile) -> Result<Vec<Synthesis>, LoadError> {
        file.models.iter().map(synthesize_declaration).collect()
    }

    /// Render the statements for already-synthesized models
    pub fn statements(&self, syntheses: &[Synthesis]) -> Result<Vec<String>, LoadError> {
        if !self.config.dialect.eq_ignore_ascii_case("postgres") {
            return Err(LoadError::UnsupportedDialect(self.config.dialect.clone()));
        }
        let mut engine = PostgresEngine::new(RecordingSink::new());
        apply(&mut engine, syntheses)?;
        Ok(engine.into_sink().into_statements())
    }

    /// Render a declaration file as one SQL script
    pub fn load(&self, file: &DeclarationFile) -> Result<String, LoadError> {
        let syntheses = self.synthesize_all(file)?;
        log::info!(
            "synthesized {} model(s), {} projected",
            syntheses.len(),
            syntheses.iter().filter(|s| s.projected).count()
        );
        let statements = self.statements(&syntheses)?;
        Ok(self.join(&statements))
    }

    /// Read `path` and render it as one SQL script
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<String, LoadError> {
        let file = read_declarations(path)?;
        self.load(&file)
    }

    fn join(&self, statements: &[String]) -> String {
        let delimiter = &self.config.statement_delimiter;
        statements
            .iter()
            .map(|s| format!("{s}{delimiter}\n"))
            .collect()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(MigrateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexsmith::{batch_extensions, ErrorKind};

    const MODELS: &str = r#"
[[model]]
name = "User"

[[model.field]]
name = "ID"
type = "u64"
tags = { orm = "primaryKey" }

[[model.field]]
name = "Email"
type = "String"
tags = { orm = "not null" }

[[model.index]]
name = "idx_users_email"
columns = [{ field = "Email", class = "gin_trgm_ops" }]
type = "gin"
extensions = ["pg_trgm"]

[[model]]
name = "Tag"
table_name = "labels"

[[model.field]]
name = "Name"
type = "String"
tags = { orm = "uniqueIndex" }

[[model.index]]
name = "idx_labels_name_trgm"
columns = [{ field = "Name", class = "gin_trgm_ops" }]
type = "gin"
extensions = ["pg_trgm", "btree_gin"]
"#;

    #[test]
    fn test_load_orders_extensions_first() {
        let file = DeclarationFile::parse(MODELS).unwrap();
        let sql = Loader::default().load(&file).unwrap();
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[0], "CREATE EXTENSION IF NOT EXISTS \"pg_trgm\";");
        assert_eq!(lines[1], "CREATE EXTENSION IF NOT EXISTS \"btree_gin\";");
        assert!(lines[2].starts_with("CREATE TABLE \"users\""));
        assert!(sql.contains("CREATE TABLE \"labels\""));
        assert!(sql.contains("USING gin (email gin_trgm_ops)"));
        // The inline unique index is replaced by the declared one
        assert!(!sql.contains("idx_labels_name\""));
        assert!(sql.contains("\"idx_labels_name_trgm\" ON \"labels\" USING gin (name gin_trgm_ops)"));
    }

    #[test]
    fn test_custom_delimiter() {
        let file = DeclarationFile::parse(MODELS).unwrap();
        let config = MigrateConfig {
            statement_delimiter: "\n--".to_string(),
            ..MigrateConfig::default()
        };
        let sql = Loader::new(config).load(&file).unwrap();
        assert!(sql.starts_with("CREATE EXTENSION IF NOT EXISTS \"pg_trgm\"\n--\n"));
    }

    #[test]
    fn test_unsupported_dialect() {
        let config = MigrateConfig {
            dialect: "sqlite".to_string(),
            ..MigrateConfig::default()
        };
        let err = Loader::new(config).load(&DeclarationFile::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDialect(d) if d == "sqlite"));
    }

    #[test]
    fn test_synthesis_error_names_the_model() {
        let source = r#"
[[model]]
name = "Broken"

[[model.field]]
name = "Name"
type = "String"

[[model.index]]
name = "idx_broken"
columns = [{ field = "Profile.City" }]
"#;
        let file = DeclarationFile::parse(source).unwrap();
        let err = Loader::default().load(&file).unwrap_err();
        match &err {
            LoadError::Synthesis { model, source } => {
                assert_eq!(model, "Broken");
                assert_eq!(source.kind(), ErrorKind::SelectorNotATopLevelField);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("model Broken:"));
    }

    #[test]
    fn test_batch_extensions() {
        let file = DeclarationFile::parse(MODELS).unwrap();
        let syntheses = Loader::default().synthesize_all(&file).unwrap();
        assert_eq!(batch_extensions(&syntheses), vec!["pg_trgm", "btree_gin"]);
    }
}
