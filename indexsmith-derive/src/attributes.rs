//! Attribute parsing utilities

use syn::{Attribute, Expr, ExprLit, Field, Lit, LitStr, Path};

/// Read the string value of a `#[name = "..."]` attribute
fn name_value_str(attr: &Attribute) -> syn::Result<LitStr> {
    let meta = attr.meta.require_name_value()?;
    match &meta.value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Struct-level attributes
#[derive(Default)]
pub struct ModelAttributes {
    pub table_name: Option<String>,
    /// Function returning the model's index declarations
    pub indexes: Option<Path>,
}

/// Parse `#[table_name = "..."]` and `#[indexes = "path"]`
pub fn parse_model_attributes(attrs: &[Attribute]) -> syn::Result<ModelAttributes> {
    let mut parsed = ModelAttributes::default();
    for attr in attrs {
        if attr.path().is_ident("table_name") {
            let lit = name_value_str(attr)?;
            if lit.value().trim().is_empty() {
                return Err(syn::Error::new_spanned(lit, "table_name must not be empty"));
            }
            parsed.table_name = Some(lit.value());
        } else if attr.path().is_ident("indexes") {
            let lit = name_value_str(attr)?;
            parsed.indexes = Some(lit.parse()?);
        }
    }
    Ok(parsed)
}

/// Field-level attributes
#[derive(Default)]
pub struct FieldAttributes {
    /// Canonical identifier override
    pub field_name: Option<String>,
    /// Metadata tags in declaration order
    pub tags: Vec<(String, String)>,
    pub embedded: bool,
    pub computed: bool,
}

/// Parse `#[tag(..)]`, `#[field_name = ".."]`, `#[embedded]` and `#[computed]`
pub fn parse_field_attributes(field: &Field) -> syn::Result<FieldAttributes> {
    let mut parsed = FieldAttributes::default();
    for attr in &field.attrs {
        if attr.path().is_ident("tag") {
            attr.parse_nested_meta(|meta| {
                let key = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("tag keys must be plain identifiers"))?
                    .to_string();
                let value: LitStr = meta.value()?.parse()?;
                parsed.tags.push((key, value.value()));
                Ok(())
            })?;
        } else if attr.path().is_ident("field_name") {
            let lit = name_value_str(attr)?;
            if lit.value().trim().is_empty() {
                return Err(syn::Error::new_spanned(lit, "field_name must not be empty"));
            }
            parsed.field_name = Some(lit.value());
        } else if attr.path().is_ident("embedded") {
            attr.meta.require_path_only()?;
            parsed.embedded = true;
        } else if attr.path().is_ident("computed") {
            attr.meta.require_path_only()?;
            parsed.computed = true;
        }
    }
    Ok(parsed)
}
