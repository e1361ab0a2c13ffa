//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates an implementation of the `Record` trait whose
//! attributes are the struct's named fields.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::parse_record_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut attr_arms: Vec<TokenStream> = Vec::new();
    let mut key_names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let record_attrs = parse_record_attrs(&field.attrs)?;
        if record_attrs.skip {
            continue;
        }

        let attr_name = record_attrs
            .rename
            .unwrap_or_else(|| field_name.to_string().trim_start_matches("r#").to_string());

        attr_arms.push(quote! {
            #attr_name => ::core::option::Option::Some(
                ::fnc::Value::from(::core::clone::Clone::clone(&self.#field_name))
            ),
        });
        key_names.push(attr_name);
    }

    let type_name = struct_name.to_string();

    let expanded = quote! {
        impl #impl_generics ::fnc::Record for #struct_name #ty_generics #where_clause {
            fn attr(&self, name: &str) -> ::core::option::Option<::fnc::Value> {
                match name {
                    #(#attr_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn keys(&self) -> ::std::vec::Vec<::fnc::Value> {
                ::std::vec![#(::fnc::Value::from(#key_names)),*]
            }

            fn type_name(&self) -> &str {
                #type_name
            }
        }
    };

    Ok(expanded)
}
