//! Annotation merge and type projection.
//!
//! Folds assembled fragments into a model's existing field metadata and
//! produces the projected schema handed to the migration engine: the same
//! visible fields, in the same order, with the same types, but with index
//! annotations replaced by the synthesized ones.

use crate::fragment::FieldFragments;
use crate::model::{FieldSchema, ModelSchema};
use crate::tags::{pieces, Tags, ORM};

/// Whether a piece declares an index inline (`index`, `index:name,..`, `uniqueIndex..`)
fn is_index_piece(piece: &str) -> bool {
    let head = piece.split([':', ',']).next().unwrap_or(piece).trim();
    head.eq_ignore_ascii_case("index") || head.eq_ignore_ascii_case("uniqueIndex")
}

/// Remove inline index pieces from an `orm` tag value
pub fn strip_index_pieces(value: &str) -> String {
    pieces(value)
        .filter(|piece| !is_index_piece(piece))
        .collect::<Vec<_>>()
        .join(";")
}

/// Merge synthesized fragments into a field's tags
///
/// Existing inline index pieces are dropped so an index declared both inline
/// and through a declaration is only created once. The `orm` entry is removed
/// when nothing is left in it.
pub fn merge_tags(tags: &Tags, fragments: &[String]) -> Tags {
    let mut merged = tags.clone();
    let mut value = strip_index_pieces(tags.get(ORM).unwrap_or(""));
    if !fragments.is_empty() {
        let added = fragments.join(";");
        if value.is_empty() {
            value = added;
        } else {
            value = format!("{value};{added}");
        }
    }
    if value.is_empty() {
        merged.remove(ORM);
    } else {
        merged.insert(ORM, value);
    }
    merged
}

/// Project `schema` with `fragments` merged into each visible field
pub fn project(schema: &ModelSchema, fragments: &FieldFragments) -> ModelSchema {
    let fields = schema
        .visible_fields()
        .map(|field| FieldSchema {
            tags: merge_tags(&field.tags, fragments.get(&field.name)),
            ..field.clone()
        })
        .collect();
    ModelSchema {
        name: schema.name.clone(),
        kind: schema.kind,
        fields,
    }
}
