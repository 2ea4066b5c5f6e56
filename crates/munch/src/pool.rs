//! Connection pool utilities

use crate::config::SqlConfig;
use crate::error::{MunchError, MunchResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a Postgres connection pool from `config`.
///
/// Uses `NoTls`. Use [`create_pool_with_tls`] if the server requires TLS.
///
/// # Example
///
/// ```ignore
/// let pool = munch::create_pool(&config, 16)?;
/// let db = QueryBuilder::new(pool.get().await?, Dialect::Postgres);
/// ```
pub fn create_pool(config: &SqlConfig, max_size: usize) -> MunchResult<Pool> {
    create_pool_with_tls(config, NoTls, |builder| builder.max_size(max_size))
}

/// Create a connection pool using a custom TLS connector and pool tuning.
pub fn create_pool_with_tls<T>(
    config: &SqlConfig,
    tls: T,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> MunchResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config = config.pg_config()?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| MunchError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn mysql_config_cannot_be_pooled() {
        let err = create_pool(&SqlConfig::new(Dialect::MySql), 4).unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn builds_from_config_with_empty_password() {
        let config = SqlConfig::new(Dialect::Postgres)
            .with_user("postgres")
            .with_db_name("app");
        assert!(create_pool(&config, 2).is_ok());
    }

    #[test]
    fn builds_without_connecting() {
        let config = SqlConfig::new(Dialect::Postgres)
            .with_user("postgres")
            .with_pass("secret")
            .with_db_name("app");
        let pool = create_pool(&config, 4).unwrap();
        assert_eq!(pool.status().max_size, 4);
    }
}
