//! `#[munch(...)]` field attribute parsing.

use syn::ext::IdentExt;
use syn::{Field, LitStr, Result};

pub struct FieldAttrs {
    pub column: Option<String>,
    pub skip: bool,
}

impl FieldAttrs {
    pub fn parse(field: &Field) -> Result<Self> {
        let mut attrs = FieldAttrs {
            column: None,
            skip: false,
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("munch") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("column name must not be empty"));
                    }
                    attrs.column = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported munch attribute, expected `column` or `skip`"))
                }
            })?;
        }

        if attrs.skip && attrs.column.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "`skip` and `column` cannot be combined",
            ));
        }
        Ok(attrs)
    }
}

/// Field identifier without a raw-identifier prefix.
pub fn field_name(field: &Field) -> Option<String> {
    field.ident.as_ref().map(|ident| ident.unraw().to_string())
}
