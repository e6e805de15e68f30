//! Index fragment assembly.
//!
//! Each column of an index becomes one fragment attached to the field it
//! selects, e.g. `index:idx_files,priority:1,unique,type:gin`. The downstream
//! annotation format only has column-level attachment points, so index-wide
//! settings (`unique`, `where`, `type`) are recorded once, on the first column.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::SynthesisError;
use crate::index::{non_blank, IndexDefinition};
use crate::model::{FieldToken, ModelSchema};
use crate::naming::to_snake_case;
use crate::selector;

/// Annotation fragment for one (index, column) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pieces: Vec<String>,
}

impl Fragment {
    fn push(&mut self, piece: String) {
        self.pieces.push(piece);
    }

    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pieces.join(","))
    }
}

/// Rendered fragments per field name, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFragments {
    by_field: BTreeMap<String, Vec<String>>,
}

impl FieldFragments {
    pub fn get(&self, field: &str) -> &[String] {
        self.by_field.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.by_field.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Number of fields carrying at least one fragment
    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_field.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, field: String, fragment: &Fragment) {
        self.by_field.entry(field).or_default().push(fragment.to_string());
    }
}

/// Build one fragment per column of `index`, paired with the resolved field name
pub fn assemble<F: FieldToken>(
    schema: &ModelSchema,
    index: &IndexDefinition<F>,
) -> Result<Vec<(String, Fragment)>, SynthesisError> {
    index.validate()?;

    let where_clause = non_blank(index.where_clause.as_deref());
    let method = non_blank(index.method.as_deref());

    let mut out = Vec::with_capacity(index.columns.len());
    for (j, col) in index.columns.iter().enumerate() {
        let field = selector::resolve(schema, &col.selector).map_err(|source| {
            SynthesisError::Column {
                index: index.name.clone(),
                position: j + 1,
                source,
            }
        })?;

        let mut fragment = Fragment::default();
        fragment.push(format!("index:{}", index.name));
        fragment.push(format!("priority:{}", j + 1));
        if let Some(sort) = col.sort {
            match col.nulls {
                Some(nulls) => fragment.push(format!("sort:{sort} nulls {nulls}")),
                None => fragment.push(format!("sort:{sort}")),
            }
        }
        if j == 0 {
            if index.unique {
                fragment.push("unique".to_string());
            }
            if let Some(predicate) = where_clause {
                fragment.push(format!("where:{predicate}"));
            }
            if let Some(method) = method {
                fragment.push(format!("type:{method}"));
            }
        }
        // No bare operator-class attribute downstream: express it as a column expression.
        if let Some(class) = non_blank(col.op_class.as_deref()) {
            fragment.push(format!("expression:{} {class}", to_snake_case(field)));
        }

        out.push((field.to_string(), fragment));
    }
    Ok(out)
}

/// Assemble fragments for every declaration, grouped by field
pub fn collect_fragments<F: FieldToken>(
    schema: &ModelSchema,
    indexes: &[IndexDefinition<F>],
) -> Result<FieldFragments, SynthesisError> {
    let mut fragments = FieldFragments::default();
    for index in indexes {
        for (field, fragment) in assemble(schema, index)? {
            fragments.push(field, &fragment);
        }
    }
    Ok(fragments)
}
