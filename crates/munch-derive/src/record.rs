//! Record derive macro implementation

use crate::attrs::{FieldAttrs, field_name};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut defs = Vec::new();
    let mut values = Vec::new();
    let mut arms = Vec::new();
    let mut columns: Vec<String> = Vec::new();

    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        let ident = field.ident.as_ref();
        let rust_name = field_name(field).unwrap_or_default();
        let column = attrs.column.unwrap_or_else(|| rust_name.clone());

        if columns.contains(&column) {
            return Err(syn::Error::new_spanned(
                field,
                format!("column `{column}` is mapped by more than one field"),
            ));
        }

        let index = defs.len();
        defs.push(quote! { munch::FieldDef::new(#rust_name, #column) });
        values.push(quote! { munch::ToValue::to_value(&self.#ident) });
        arms.push(quote! {
            #index => {
                self.#ident = munch::FromValue::from_value(value)
                    .map_err(|e| munch::MunchError::decode(#column, e.to_string()))?;
            }
        });
        columns.push(column);
    }

    let set_field_body = if arms.is_empty() {
        quote! {
            let _ = value;
            Err(munch::MunchError::decode(index.to_string(), "field index out of range"))
        }
    } else {
        quote! {
            match index {
                #(#arms)*
                _ => {
                    return Err(munch::MunchError::decode(
                        index.to_string(),
                        "field index out of range",
                    ));
                }
            }
            Ok(())
        }
    };

    Ok(quote! {
        impl #impl_generics munch::Record for #name #ty_generics #where_clause {
            const FIELDS: &'static [munch::FieldDef] = &[#(#defs),*];

            fn values(&self) -> ::std::vec::Vec<munch::Value> {
                ::std::vec![#(#values),*]
            }

            fn set_field(
                &mut self,
                index: usize,
                value: munch::Value,
            ) -> munch::MunchResult<()> {
                #set_field_body
            }
        }
    })
}
