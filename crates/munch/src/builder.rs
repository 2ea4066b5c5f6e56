//! Connection-bound entry point.

use crate::config::SqlConfig;
use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::{MunchError, MunchResult};
use crate::format::ElisionPolicy;
use crate::query::Query;
use crate::record::Record;
use tokio_postgres::NoTls;

/// A connection paired with the dialect and elision policy every query it
/// creates will use.
///
/// # Example
///
/// ```ignore
/// let db = munch::connect(&SqlConfig::from_env()?).await?;
///
/// let mut q = db.table("Users");
/// q.where_raw("Email", "=", "test@test.com");
/// let user: Option<User> = db.fetch_opt(&q).await?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<C> {
    conn: C,
    dialect: Dialect,
    elision: ElisionPolicy,
}

impl<C: Connection> QueryBuilder<C> {
    pub fn new(conn: C, dialect: Dialect) -> Self {
        Self {
            conn,
            dialect,
            elision: ElisionPolicy::default(),
        }
    }

    /// Use `policy` for every query created from now on.
    pub fn with_elision(mut self, policy: ElisionPolicy) -> Self {
        self.elision = policy;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn elision(&self) -> ElisionPolicy {
        self.elision
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Start a SELECT over `name`.
    pub fn table(&self, name: impl Into<String>) -> Query {
        let mut query = Query::new(name, self.dialect);
        query.with_elision(self.elision);
        query
    }

    pub async fn exec(&self, query: &Query) -> MunchResult<u64> {
        query.exec(&self.conn).await
    }

    pub async fn exec_into<T: Record>(&self, query: &Query, target: &mut T) -> MunchResult<bool> {
        query.exec_into(&self.conn, target).await
    }

    pub async fn exec_collect<T: Record>(
        &self,
        query: &Query,
        out: &mut Vec<T>,
    ) -> MunchResult<usize> {
        query.exec_collect(&self.conn, out).await
    }

    pub async fn fetch_all<T: Record>(&self, query: &Query) -> MunchResult<Vec<T>> {
        query.fetch_all(&self.conn).await
    }

    pub async fn fetch_opt<T: Record>(&self, query: &Query) -> MunchResult<Option<T>> {
        query.fetch_opt(&self.conn).await
    }
}

/// Open a Postgres connection described by `config`.
///
/// The connection driver runs on a spawned tokio task, so this must be called
/// inside a tokio runtime. No MySQL driver is bundled: a MySQL config fails
/// with [`MunchError::Connection`]. Implement [`Connection`] for your own
/// client and use [`QueryBuilder::new`] instead.
pub async fn connect(config: &SqlConfig) -> MunchResult<QueryBuilder<tokio_postgres::Client>> {
    let (client, connection) = config
        .pg_config()?
        .connect(NoTls)
        .await
        .map_err(|e| MunchError::Connection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "munch.sql", error = %e, "postgres connection closed with error");
        }
    });

    tracing::debug!(
        target: "munch.sql",
        host = %config.host,
        port = config.port,
        db = %config.db_name,
        "connected"
    );

    Ok(QueryBuilder::new(client, Dialect::Postgres).with_elision(config.elision))
}
