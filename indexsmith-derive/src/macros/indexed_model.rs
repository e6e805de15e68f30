//! IndexedModel derive macro implementation
//!
//! Generates the `<Name>Field` token enum and the `IndexedModel` impl.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, Ident, LitStr, Visibility};

use crate::attributes;
use crate::utils;

pub fn expand_indexed_model(input: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "IndexedModel can only be derived for structs with named fields",
            ));
        }
    };

    let model_attrs = attributes::parse_model_attributes(&input.attrs)?;
    let field_enum = Ident::new(&format!("{}Field", struct_name), struct_name.span());
    let struct_name_lit = LitStr::new(&struct_name.to_string(), struct_name.span());

    let mut variants = Vec::new();
    let mut name_arms = Vec::new();
    let mut field_schemas = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = attributes::parse_field_attributes(field)?;
        let pascal = utils::pascal_case(&ident.to_string());
        let canonical = attrs.field_name.clone().unwrap_or_else(|| pascal.clone());
        if !seen.insert(canonical.clone()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("duplicate field name {canonical:?}"),
            ));
        }
        let canonical_lit = LitStr::new(&canonical, ident.span());
        let ty_lit = LitStr::new(&utils::type_string(&field.ty), ident.span());
        let visible = matches!(field.vis, Visibility::Public(_));

        if visible {
            let variant = Ident::new(&pascal, ident.span());
            name_arms.push(quote! { Self::#variant => #canonical_lit });
            variants.push(variant);
        }

        let hidden = (!visible).then(|| quote! { .hidden() });
        let embedded = attrs.embedded.then(|| quote! { .embedded() });
        let computed = attrs.computed.then(|| quote! { .computed() });
        let tags = attrs.tags.iter().map(|(key, value)| {
            quote! { .tag(#key, #value) }
        });
        field_schemas.push(quote! {
            .field(
                ::indexsmith::FieldSchema::new(#canonical_lit, #ty_lit)
                    #hidden #embedded #computed #(#tags)*
            )
        });
    }

    let table_name_fn = model_attrs.table_name.as_ref().map(|name| {
        quote! {
            fn table_name(&self) -> ::std::option::Option<::std::string::String> {
                ::std::option::Option::Some(#name.to_string())
            }
        }
    });
    let indexes_fn = model_attrs.indexes.as_ref().map(|path| {
        quote! {
            fn indexes(&self) -> ::std::vec::Vec<::indexsmith::IndexDefinition<#field_enum>> {
                #path(self)
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let enum_doc = format!("Exported fields of [`{}`]", struct_name);

    Ok(quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum #field_enum {
            #(#variants,)*
        }

        impl ::indexsmith::FieldToken for #field_enum {
            fn name(&self) -> &'static str {
                match *self {
                    #(#name_arms,)*
                }
            }
        }

        impl #impl_generics ::indexsmith::IndexedModel for #struct_name #ty_generics #where_clause {
            type Field = #field_enum;

            fn schema() -> ::indexsmith::ModelSchema {
                ::indexsmith::ModelSchema::new(#struct_name_lit)
                    #(#field_schemas)*
            }

            #table_name_fn

            #indexes_fn
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Status { Active, Archived }
        };
        let err = expand_indexed_model(&input).unwrap_err();
        assert!(err.to_string().contains("structs with named fields"));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u32, u32);
        };
        assert!(expand_indexed_model(&input).is_err());
    }

    #[test]
    fn test_expansion_lists_exported_fields_only() {
        let input: DeriveInput = parse_quote! {
            #[table_name = "notebook_files"]
            pub struct NotebookFile {
                #[field_name = "TenantID"]
                pub tenant_id: String,
                pub file_name: String,
                cache: Vec<u8>,
            }
        };
        let expanded = expand_indexed_model(&input).unwrap().to_string();
        assert!(expanded.contains("enum NotebookFileField"));
        assert!(expanded.contains("TenantId"));
        assert!(expanded.contains("\"TenantID\""));
        assert!(expanded.contains("FileName"));
        assert!(expanded.contains("hidden"));
        assert!(expanded.contains("\"notebook_files\""));
        assert!(!expanded.contains("fn indexes"));
    }

    #[test]
    fn test_rejects_duplicate_field_names() {
        let input: DeriveInput = parse_quote! {
            pub struct Person {
                #[field_name = "Name"]
                pub first_name: String,
                #[field_name = "Name"]
                pub last_name: String,
            }
        };
        let err = expand_indexed_model(&input).unwrap_err();
        assert_eq!(err.to_string(), "duplicate field name \"Name\"");

        let renamed_onto_default: DeriveInput = parse_quote! {
            pub struct Person {
                pub first_name: String,
                #[field_name = "FirstName"]
                pub given_name: String,
            }
        };
        assert!(expand_indexed_model(&renamed_onto_default).is_err());
    }
}
