//! # munch
//!
//! A fluent, dialect-aware SQL statement builder with record <-> row mapping.
//!
//! ## Features
//!
//! - **Record-driven**: filters, INSERT values and UPDATE assignments come straight from a struct
//! - **Partial records**: fields left empty are omitted, so one type serves lookups and writes
//! - **Two dialects**: MySQL and Postgres identifier/string quoting
//! - **Name-based decoding**: result columns map back onto fields by column name
//! - **Bring your own driver**: anything implementing [`Connection`] can execute statements
//!
//! ## Example
//!
//! ```ignore
//! use munch::prelude::*;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[munch(column = "userId")]
//!     id: i64,
//!     #[munch(column = "email")]
//!     email: String,
//! }
//!
//! let db = munch::connect(&SqlConfig::from_env()?).await?;
//!
//! // SELECT * FROM "Users" WHERE "email" = 'test@test.com';
//! let mut q = db.table("Users");
//! q.where_record(&User { email: "test@test.com".into(), ..Default::default() });
//! let users: Vec<User> = db.fetch_all(&q).await?;
//!
//! // DELETE FROM "Users" WHERE "userId" IN (1, 2, 3);
//! let mut q = db.table("Users");
//! q.del().where_in("userId", vec![1, 2, 3], false);
//! db.exec(&q).await?;
//! ```
//!
//! Values are rendered inline as literals (quotes doubled), not bound as
//! parameters.

pub mod builder;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod format;
pub mod predicate;
pub mod prelude;
pub mod query;
pub mod record;
pub mod scan;
pub mod value;

pub use builder::{QueryBuilder, connect};
pub use config::SqlConfig;
pub use connection::{Connection, rows_to_row_set};
pub use dialect::Dialect;
pub use error::{MunchError, MunchResult, RowDecodeError};
pub use format::{ElisionPolicy, format_value};
pub use predicate::{Filter, PredicateSet};
pub use query::{Operation, Query};
pub use record::{FieldDef, Record, RecordSchema, columns_of, extract};
pub use scan::{CellError, RowCells, RowScanner, RowSet, ScanOutcome, scan_all, scan_into, scan_row};
pub use value::{FromValue, ToValue, Value, ValueTypeError};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_tls};

#[cfg(feature = "derive")]
pub use munch_derive::Record;
