//! Convenient imports for typical `munch` usage.
//!
//! ```ignore
//! use munch::prelude::*;
//! ```

pub use crate::{
    Connection, Dialect, ElisionPolicy, MunchError, MunchResult, Query, QueryBuilder, Record,
    SqlConfig, Value, connect,
};

#[cfg(feature = "pool")]
pub use crate::create_pool;
