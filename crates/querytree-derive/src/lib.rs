//! Derive macro mapping structs to tables.
//!
//! This crate provides `#[derive(Entity)]`, which implements
//! `querytree_core::schema::Entity` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta};

/// Derives `Entity` for a struct, mapping each field to a column.
///
/// # Attributes
///
/// - `#[entity(table = "table_name")]` - Specifies the SQL table name
///   (optional, defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(skip)]` - Leaves the field unmapped
///
/// # Generated Items
///
/// - `impl Entity for Struct` with `TABLE` and `COLUMNS` in field order
/// - `Struct::table()` returning a `Table` with every column interned
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut columns = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let attribute = field_name.to_string();
        let column = attrs.name.unwrap_or_else(|| attribute.clone());
        columns.push(quote! { (#attribute, #column) });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::querytree_core::schema::Entity for #struct_name #ty_generics #where_clause {
            const TABLE: &'static str = #table_name;
            const COLUMNS: &'static [(&'static str, &'static str)] = &[#(#columns),*];
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Returns the mapped table with its columns interned.
            #[must_use]
            pub fn table() -> ::querytree_core::Table {
                ::querytree_core::Table::for_entity::<Self>()
            }
        }
    })
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    skip: bool,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    let mut table_name = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute"))
            }
        })?;
    }
    Ok(table_name.unwrap_or_else(|| to_snake_case(&struct_name.to_string())))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("column")) {
        // Bare #[column]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported column attribute"))
            }
        })?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Author"), "author");
        assert_eq!(to_snake_case("BookAuthor"), "book_author");
    }

    #[test]
    fn test_unknown_column_attribute_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Author {
                #[column(primary)]
                id: i64,
            }
        };
        assert!(derive_entity_impl(&input).is_err());
    }

    #[test]
    fn test_expansion_lists_columns() {
        let input: DeriveInput = syn::parse_quote! {
            #[entity(table = "authors")]
            struct Author {
                id: i64,
                #[column(name = "given_name")]
                first_name: String,
                #[column(skip)]
                cache: u8,
            }
        };
        let tokens = derive_entity_impl(&input).unwrap().to_string();
        assert!(tokens.contains("\"authors\""));
        assert!(tokens.contains("\"given_name\""));
        assert!(!tokens.contains("\"cache\""));
    }
}
