//! Boundary with the schema-migration engine.
//!
//! The engine turns projected schemas into DDL; this crate only defines the
//! interface it is driven through. Emitted statements go to a
//! [`StatementSink`], so tests can capture them instead of running them.

use std::fmt;

use crate::extensions::batch_extensions;
use crate::model::ModelSchema;
use crate::synthesis::Synthesis;

/// Errors reported by a migration engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine cannot migrate this model
    Rejected { model: String, reason: String },
    Other(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Rejected { model, reason } => {
                write!(f, "Migration engine rejected {model}: {reason}")
            }
            EngineError::Other(msg) => write!(f, "Migration engine error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Consumer of synthesized schemas
pub trait MigrationEngine {
    /// Enable a database extension before any table is created
    fn create_extension(&mut self, name: &str) -> Result<(), EngineError>;

    /// Migrate one model, under `table` when the model names its table
    fn migrate(&mut self, table: Option<&str>, schema: &ModelSchema) -> Result<(), EngineError>;
}

/// Destination for emitted statements
pub trait StatementSink {
    fn record(&mut self, statement: String);

    fn statements(&self) -> &[String];

    fn reset(&mut self);
}

/// In-memory [`StatementSink`] that keeps statements in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    statements: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

impl StatementSink for RecordingSink {
    fn record(&mut self, statement: String) {
        self.statements.push(statement);
    }

    fn statements(&self) -> &[String] {
        &self.statements
    }

    fn reset(&mut self) {
        self.statements.clear();
    }
}

/// Drive `engine` with a batch of syntheses
///
/// Every required extension is created first, once, in order of first
/// appearance across the batch; then each model is migrated in order.
pub fn apply<E: MigrationEngine + ?Sized>(
    engine: &mut E,
    syntheses: &[Synthesis],
) -> Result<(), EngineError> {
    for ext in batch_extensions(syntheses) {
        engine.create_extension(&ext)?;
    }
    for synthesis in syntheses {
        engine.migrate(synthesis.table_name.as_deref(), &synthesis.schema)?;
    }
    Ok(())
}
