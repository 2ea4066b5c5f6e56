//! Record types and their column mapping.
//!
//! A [`Record`] declares its fields once, in declaration order, as
//! [`FieldDef`]s (normally via `#[derive(Record)]`). [`RecordSchema`] is the
//! cached per-type view used for column lists, value extraction and row
//! decoding.

use crate::error::{MunchError, MunchResult};
use crate::value::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// One field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Rust field identifier.
    pub name: &'static str,
    /// SQL column name: the `#[munch(column = "...")]` override, or the field name.
    pub column: &'static str,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

/// A struct that maps to a relational row.
///
/// This trait should typically be derived using `#[derive(Record)]`.
///
/// # Example
///
/// ```ignore
/// use munch::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Group {
///     #[munch(column = "GroupId")]
///     gid: i64,
///     #[munch(column = "GroupName")]
///     name: String,
/// }
/// ```
pub trait Record: Default + 'static {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldDef];

    /// Field values in declaration order, one per entry of [`Record::FIELDS`].
    fn values(&self) -> Vec<Value>;

    /// Assign a decoded value to the field at `index`.
    fn set_field(&mut self, index: usize, value: Value) -> MunchResult<()>;
}

/// Cached column mapping for a record type.
#[derive(Debug)]
pub struct RecordSchema {
    type_name: &'static str,
    fields: &'static [FieldDef],
    index: HashMap<&'static str, usize>,
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<RecordSchema>>>;

fn cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

impl RecordSchema {
    fn build<T: Record>() -> Self {
        let index = T::FIELDS
            .iter()
            .enumerate()
            .map(|(i, f)| (f.column, i))
            .collect();
        Self {
            type_name: std::any::type_name::<T>(),
            fields: T::FIELDS,
            index,
        }
    }

    /// Schema for `T`, derived on first use and shared afterwards.
    pub fn of<T: Record>() -> Arc<RecordSchema> {
        let key = TypeId::of::<T>();

        // Fast path: already cached.
        if let Some(schema) = cache()
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Arc::clone(schema);
        }

        let built = Arc::new(Self::build::<T>());
        let mut map = cache()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(map.entry(key).or_insert(built))
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    /// Column names in field-declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.column)
    }

    /// Field index for a column name.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Field index for a column name, or a decode error naming the record type.
    pub fn require_index(&self, column: &str) -> MunchResult<usize> {
        self.index_of(column).ok_or_else(|| {
            MunchError::decode(column, format!("no field of {} maps to this column", self.type_name))
        })
    }
}

/// Column names of `T` in field-declaration order.
pub fn columns_of<T: Record>() -> Vec<&'static str> {
    T::FIELDS.iter().map(|f| f.column).collect()
}

/// `(column, value)` pairs of a record, in field-declaration order.
///
/// Every field is extracted; callers select which ones matter by leaving the
/// rest at values the active elision policy omits.
pub fn extract<T: Record>(record: &T) -> Vec<(&'static str, Value)> {
    T::FIELDS
        .iter()
        .map(|f| f.column)
        .zip(record.values())
        .collect()
}
