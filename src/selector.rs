//! Column selector resolution.
//!
//! A selector is resolved against the model's table of top-level fields.
//! Only externally visible, stored fields are valid targets; nested paths are
//! rejected, so an index can never reach into an embedded record's fields.
//! Embedded, computed and `orm:"-"` fields have no column of their own and
//! are not addressable either.

use crate::error::SelectorError;
use crate::index::Selector;
use crate::model::{FieldToken, ModelSchema};

/// Resolve `selector` to the canonical name of the field it addresses
pub fn resolve<'s, F: FieldToken>(
    schema: &'s ModelSchema,
    selector: &Selector<F>,
) -> Result<&'s str, SelectorError> {
    match selector {
        Selector::Field(token) => lookup(schema, token.name()),
        Selector::Path(path) => {
            let path = path.trim();
            check_shape(path)?;
            if path.contains('.') {
                return Err(not_top_level(schema, path));
            }
            lookup(schema, path)
        }
    }
}

fn lookup<'s>(schema: &'s ModelSchema, name: &str) -> Result<&'s str, SelectorError> {
    let field = schema
        .fields
        .iter()
        .find(|f| f.name == name && f.visible)
        .ok_or_else(|| not_top_level(schema, name))?;
    if field.computed || field.embedded || field.tags.orm_flag("-") {
        return Err(SelectorError::SelectorNotAddressable(name.to_string()));
    }
    Ok(&field.name)
}

/// A path is one or more identifiers joined by `.`
fn check_shape(path: &str) -> Result<(), SelectorError> {
    let valid = !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(SelectorError::InvalidSelectorShape(path.to_string()))
    }
}

fn not_top_level(schema: &ModelSchema, selector: &str) -> SelectorError {
    SelectorError::SelectorNotATopLevelField {
        selector: selector.to_string(),
        model: schema.name.clone(),
    }
}
