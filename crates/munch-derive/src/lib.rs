//! Derive macros for munch
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive `munch::Record` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use munch::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct LunaUser {
///     #[munch(column = "userId")]
///     user_id: i64,
///     username: String,
///     #[munch(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[munch(column = "name")]` - Map field to a different column name
/// - `#[munch(skip)]` - Leave the field out of the mapping (it keeps its `Default` value when decoding)
///
/// Every mapped field type must implement `munch::ToValue` and `munch::FromValue`.
#[proc_macro_derive(Record, attributes(munch))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
