//! Procedural macros for indexsmith
//!
//! This crate provides the `IndexedModel` derive. Use it through the
//! `indexsmith` re-export.

mod attributes;
mod macros;
mod utils;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for `IndexedModel`
///
/// This macro generates:
/// - `<Name>Field` enum (one variant per `pub` field, implementing `FieldToken`)
/// - `IndexedModel::schema()` describing every field in declaration order
/// - `IndexedModel::table_name()` when `#[table_name = "..."]` is present
/// - `IndexedModel::indexes()` when `#[indexes = "path::to::fn"]` is present
///
/// Field attributes: `#[tag(orm = "...", json = "...")]`, `#[field_name = "..."]`,
/// `#[embedded]`, `#[computed]`.
#[proc_macro_derive(IndexedModel, attributes(table_name, indexes, tag, field_name, embedded, computed))]
pub fn derive_indexed_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    macros::expand_indexed_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
