//! indexsmith migration library
//!
//! Loads model declarations, runs index synthesis and renders the resulting
//! PostgreSQL DDL. The CLI tool (main.rs) uses this library.

pub mod config;
pub mod declarations;
pub mod loader;
pub mod sql_generator;

pub use config::MigrateConfig;
pub use declarations::DeclarationFile;
pub use loader::{LoadError, Loader};
pub use sql_generator::PostgresEngine;
