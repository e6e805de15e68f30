//! Required database extensions

use std::collections::HashSet;

use crate::index::IndexDefinition;
use crate::model::IndexedModel;
use crate::synthesis::Synthesis;

/// Extensions referenced by `indexes`, deduplicated in order of first appearance
///
/// Blank names are skipped. Order is kept (not sorted) so generated output is
/// stable across runs.
pub fn required_extensions<F>(indexes: &[IndexDefinition<F>]) -> Vec<String> {
    first_appearances(indexes.iter().flat_map(|index| index.extensions.iter()))
}

/// Extensions required across a batch of syntheses, in order of first appearance
pub fn batch_extensions(syntheses: &[Synthesis]) -> Vec<String> {
    first_appearances(syntheses.iter().flat_map(|s| s.extensions.iter()))
}

fn first_appearances<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut extensions = Vec::new();
    for name in names {
        let name = name.trim();
        if !name.is_empty() && seen.insert(name) {
            extensions.push(name.to_string());
        }
    }
    extensions
}

/// Extensions required by `model`'s declared indexes; empty when there is no model
pub fn extensions_of<M: IndexedModel>(model: Option<&M>) -> Vec<String> {
    model
        .map(|m| required_extensions(&m.indexes()))
        .unwrap_or_default()
}
