//! Derive macro for entity-set metadata.
//!
//! This crate provides `#[derive(EntitySet)]`, which describes where a struct
//! is stored so that `Scan` nodes over it can be built without spelling out
//! table and property names by hand.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, parse_macro_input};

/// Derives `sqlfrag_core::schema::EntitySet` for a struct.
///
/// # Attributes
///
/// - `#[entity_set(name = "table_name")]` - Specifies the SQL table name
///   (optional, defaults to snake_case of struct name)
/// - `#[entity_set(schema = "schema_name")]` - Qualifies the table with a
///   schema
///
/// # Field Attributes
///
/// - `#[property(key)]` - Marks the field as part of the entity key
/// - `#[property(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[property(skip)]` - Leaves the field out of the entity set
#[proc_macro_derive(EntitySet, attributes(entity_set, property))]
pub fn derive_entity_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_set_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_set_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let set_attrs = parse_entity_set_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "EntitySet derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "EntitySet derive only supports structs",
            ));
        }
    };

    let mut properties: Vec<String> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_property_attrs(&field.attrs)?;
        if attrs.skip {
            if attrs.key {
                return Err(syn::Error::new_spanned(
                    field,
                    "a skipped field cannot be part of the key",
                ));
            }
            continue;
        }
        let name = attrs.name.unwrap_or_else(|| field_name.to_string());
        if properties.contains(&name) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate property name `{name}`"),
            ));
        }
        if attrs.key {
            keys.push(name.clone());
        }
        properties.push(name);
    }

    let table_name = &set_attrs.name;
    let schema = match &set_attrs.schema {
        Some(schema) => quote! { Some(#schema) },
        None => quote! { None },
    };
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sqlfrag_core::schema::EntitySet for #struct_name #ty_generics #where_clause {
            const TABLE: &'static str = #table_name;
            const SCHEMA: Option<&'static str> = #schema;
            const PROPERTIES: &'static [&'static str] = &[#(#properties),*];
            const KEYS: &'static [&'static str] = &[#(#keys),*];
        }
    })
}

struct EntitySetAttrs {
    name: String,
    schema: Option<String>,
}

#[derive(Default)]
struct PropertyAttrs {
    name: Option<String>,
    key: bool,
    skip: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_entity_set_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<EntitySetAttrs> {
    let mut name = None;
    let mut schema = None;
    for attr in attrs {
        if attr.path().is_ident("entity_set") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    name = Some(string_value(&meta)?);
                } else if meta.path.is_ident("schema") {
                    schema = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unknown entity_set attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(EntitySetAttrs {
        // Default to snake_case of struct name
        name: name.unwrap_or_else(|| to_snake_case(&struct_name.to_string())),
        schema,
    })
}

fn parse_property_attrs(attrs: &[Attribute]) -> syn::Result<PropertyAttrs> {
    let mut result = PropertyAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("property") {
            // Handle empty attribute like #[property]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    result.key = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unknown property attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
