//! # indexsmith
//!
//! Declare composite database indexes next to a data model and project them
//! into the per-field annotations a schema-migration engine understands.
//!
//! A model implements [`IndexedModel`] (usually through
//! `#[derive(IndexedModel)]`) and returns its [`IndexDefinition`]s. Synthesis
//! resolves each column to a field, assembles one annotation fragment per
//! column, merges the fragments into the field metadata and reports the
//! database extensions the indexes need.
//!
//! ```
//! use indexsmith::{synthesize, Col, FieldSchema, IndexDefinition, IndexedModel, ModelSchema, NoField};
//!
//! struct Document;
//!
//! impl IndexedModel for Document {
//!     type Field = NoField;
//!
//!     fn schema() -> ModelSchema {
//!         ModelSchema::new("Document")
//!             .field(FieldSchema::new("ID", "u64").tag("orm", "primaryKey"))
//!             .field(FieldSchema::new("Title", "String"))
//!     }
//!
//!     fn indexes(&self) -> Vec<IndexDefinition<NoField>> {
//!         vec![IndexDefinition::new("idx_documents_title")
//!             .column(Col::path("Title").class("gin_trgm_ops"))
//!             .method("gin")
//!             .extension("pg_trgm")]
//!     }
//! }
//!
//! let synthesis = synthesize(&Document).unwrap();
//! assert_eq!(
//!     synthesis.schema.get("Title").unwrap().tags.get("orm"),
//!     Some("index:idx_documents_title,priority:1,type:gin,expression:title gin_trgm_ops")
//! );
//! assert_eq!(synthesis.extensions, vec!["pg_trgm"]);
//! ```

extern crate self as indexsmith;

pub mod engine;
pub mod error;
pub mod extensions;
pub mod fragment;
pub mod index;
pub mod model;
pub mod naming;
pub mod projection;
pub mod selector;
pub mod synthesis;
pub mod tags;

pub use engine::{apply, EngineError, MigrationEngine, RecordingSink, StatementSink};
pub use error::{ErrorKind, SelectorError, SynthesisError};
pub use extensions::{batch_extensions, extensions_of, required_extensions};
pub use index::{Col, IndexDefinition, Nulls, Selector, Sort};
pub use model::{FieldSchema, FieldToken, IndexedModel, ModelKind, ModelSchema, NoField};
pub use synthesis::{synthesize, synthesize_schema, Synthesis};
pub use tags::Tags;

pub use indexsmith_derive::IndexedModel;
