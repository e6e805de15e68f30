//! Error types for index synthesis
//!
//! Every error here is a configuration error: the caller's model or index
//! declarations are malformed. None of them are transient, so callers should
//! surface them rather than retry.

use std::fmt;

use crate::model::ModelKind;

/// Failure to resolve a column selector to a top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector is not a well-formed field reference (empty, bad characters, ...)
    InvalidSelectorShape(String),
    /// The selector names something with no stored column behind it
    SelectorNotAddressable(String),
    /// The selector does not name a top-level, externally visible field
    SelectorNotATopLevelField { selector: String, model: String },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::InvalidSelectorShape(selector) => {
                write!(f, "selector {selector:?} is not a valid field reference")
            }
            SelectorError::SelectorNotAddressable(selector) => {
                write!(
                    f,
                    "selector {selector:?} names a field with no stored column"
                )
            }
            SelectorError::SelectorNotATopLevelField { selector, model } => {
                write!(
                    f,
                    "selector {selector:?} didn't point to a top-level exported field on {model}"
                )
            }
        }
    }
}

impl std::error::Error for SelectorError {}

/// Flat classification of [`SynthesisError`], handy for matching in tests and CLIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NilModel,
    NotAStruct,
    DuplicateField,
    InvalidSelectorShape,
    SelectorNotAddressable,
    SelectorNotATopLevelField,
    MalformedDeclaration,
}

/// Errors raised while synthesizing index annotations for a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// No model was supplied
    NilModel,
    /// The model's shape is not a record with named fields
    NotAStruct { model: String, kind: ModelKind },
    /// Two fields of the model share a canonical name
    DuplicateField { model: String, field: String },
    /// An index declaration is missing a required part
    MalformedDeclaration { index: String, reason: String },
    /// A column of an index could not be resolved
    Column {
        index: String,
        /// 1-based column position within the index
        position: usize,
        source: SelectorError,
    },
}

impl SynthesisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthesisError::NilModel => ErrorKind::NilModel,
            SynthesisError::NotAStruct { .. } => ErrorKind::NotAStruct,
            SynthesisError::DuplicateField { .. } => ErrorKind::DuplicateField,
            SynthesisError::MalformedDeclaration { .. } => ErrorKind::MalformedDeclaration,
            SynthesisError::Column { source, .. } => match source {
                SelectorError::InvalidSelectorShape(_) => ErrorKind::InvalidSelectorShape,
                SelectorError::SelectorNotAddressable(_) => ErrorKind::SelectorNotAddressable,
                SelectorError::SelectorNotATopLevelField { .. } => {
                    ErrorKind::SelectorNotATopLevelField
                }
            },
        }
    }

    pub(crate) fn malformed(index: &str, reason: impl Into<String>) -> Self {
        SynthesisError::MalformedDeclaration {
            index: index.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::NilModel => write!(f, "nil model"),
            SynthesisError::NotAStruct { model, kind } => {
                write!(f, "model {model} must be a struct, got {kind}")
            }
            SynthesisError::DuplicateField { model, field } => {
                write!(f, "model {model} declares field {field:?} more than once")
            }
            SynthesisError::MalformedDeclaration { index, reason } => {
                write!(f, "index {index:?} is malformed: {reason}")
            }
            SynthesisError::Column {
                index,
                position,
                source,
            } => write!(f, "index {index:?} column {position}: {source}"),
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthesisError::Column { source, .. } => Some(source),
            _ => None,
        }
    }
}
