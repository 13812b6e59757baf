//! Derive macros for decoding query rows into structs.
//!
//! This crate provides the `#[derive(Record)]` macro, which writes the static
//! field table and per-field decoding hook that `namedsql-core` uses in place
//! of runtime reflection.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives the `Record` trait for a struct with named fields.
///
/// Columns are paired with fields by position. Column `i` decodes into field
/// `i` when its name equals the field name ignoring ASCII case, or equals the
/// name given with `#[column(name = "...")]`. The struct must implement
/// `Default`; fields without a matching column keep their default value.
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Matches the field to this column
///   name in addition to its own name
/// - `#[column(unmatched)]` - Collects every column that pairs with no field,
///   as `(name, value)`. The field takes no position of its own and must
///   have a `push((String, SqlValue))` method, such as
///   `Vec<(String, SqlValue)>`. At most one field may carry it.
///
/// # Example
///
/// ```ignore
/// use namedsql_core::SqlValue;
/// use namedsql_derive::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     id: i64,
///     #[column(name = "user_name")]
///     name: String,
///     email: Option<String>,
///     #[column(unmatched)]
///     extra: Vec<(String, SqlValue)>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    let mut unmatched: Option<Ident> = None;
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.unmatched {
            if attrs.name.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "`unmatched` cannot be combined with `name`",
                ));
            }
            if unmatched.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked `unmatched`",
                ));
            }
            unmatched = Some(ident);
            continue;
        }
        field_infos.push(FieldInfo {
            name: ident.unraw().to_string(),
            column: attrs.name,
            ident,
        });
    }

    let mappings: Vec<TokenStream2> = field_infos
        .iter()
        .map(|info| {
            let name = &info.name;
            match &info.column {
                Some(column) => quote! {
                    ::namedsql_core::record::FieldMapping::tagged(#name, #column)
                },
                None => quote! {
                    ::namedsql_core::record::FieldMapping::new(#name)
                },
            }
        })
        .collect();

    let arms: Vec<TokenStream2> = field_infos
        .iter()
        .enumerate()
        .map(|(index, info)| {
            let ident = &info.ident;
            quote! {
                #index => {
                    self.#ident = ::namedsql_core::record::decode_value(column, value)?;
                }
            }
        })
        .collect();

    let unmatched_hook = unmatched.map(|ident| {
        quote! {
            fn decode_unmatched(&mut self, column: &str, value: &::namedsql_core::SqlValue) {
                self.#ident.push((
                    ::std::string::ToString::to_string(column),
                    ::core::clone::Clone::clone(value),
                ));
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::namedsql_core::record::Record for #struct_name #ty_generics #where_clause {
            const FIELDS: &'static [::namedsql_core::record::FieldMapping] = &[
                #(#mappings),*
            ];

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                field: usize,
                column: &str,
                value: &::namedsql_core::SqlValue,
            ) -> ::namedsql_core::Result<()> {
                match field {
                    #(#arms)*
                    _ => {}
                }
                ::core::result::Result::Ok(())
            }

            #unmatched_hook
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    name: String,
    column: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    unmatched: bool,
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut parsed = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: Expr = meta.value()?.parse()?;
                    if let Expr::Lit(lit) = value {
                        if let Lit::Str(s) = lit.lit {
                            parsed.name = Some(s.value());
                            return Ok(());
                        }
                    }
                    Err(meta.error("expected a string literal"))
                } else if meta.path.is_ident("unmatched") {
                    parsed.unmatched = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported column attribute"))
                }
            })?;
        }
    }

    Ok(parsed)
}
