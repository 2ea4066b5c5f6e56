//! Connection configuration.

use crate::dialect::Dialect;
use crate::error::{MunchError, MunchResult};
use crate::format::ElisionPolicy;
use serde::{Deserialize, Serialize};
use tokio_postgres::config::SslMode;

/// Where and how to connect, plus the rendering policy for builders created from it.
///
/// # Example
///
/// ```rust
/// use munch::{Dialect, SqlConfig};
///
/// let config = SqlConfig::new(Dialect::Postgres)
///     .with_host("localhost")
///     .with_port(5432)
///     .with_user("postgres")
///     .with_pass("secret")
///     .with_db_name("app");
/// assert_eq!(
///     config.connection_string(),
///     "host=localhost port=5432 user=postgres password=secret dbname=app sslmode=disable"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub client: Dialect,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub db_name: String,
    /// Postgres `sslmode` (`disable`, `prefer`, `require`). Unused for MySQL.
    pub ssl_mode: String,
    pub elision: ElisionPolicy,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl SqlConfig {
    /// Defaults for `client`: localhost on the dialect's standard port.
    pub fn new(client: Dialect) -> Self {
        let port = match client {
            Dialect::MySql => 3306,
            Dialect::Postgres => 5432,
        };
        Self {
            client,
            host: "localhost".to_string(),
            port,
            user: String::new(),
            pass: String::new(),
            db_name: String::new(),
            ssl_mode: "disable".to_string(),
            elision: ElisionPolicy::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_pass(mut self, pass: impl Into<String>) -> Self {
        self.pass = pass.into();
        self
    }

    pub fn with_db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = db_name.into();
        self
    }

    pub fn with_ssl_mode(mut self, ssl_mode: impl Into<String>) -> Self {
        self.ssl_mode = ssl_mode.into();
        self
    }

    pub fn with_elision(mut self, elision: ElisionPolicy) -> Self {
        self.elision = elision;
        self
    }

    /// Read `MUNCH_*` environment variables, keeping defaults for missing ones.
    ///
    /// `MUNCH_CLIENT` goes through [`Dialect::from_name_or_default`], so an
    /// unknown client name falls back to MySQL with a warning. A port that is
    /// not a number, or an unknown `MUNCH_ELISION`, is a validation error.
    pub fn from_env() -> MunchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MunchResult<Self> {
        let client = lookup("MUNCH_CLIENT")
            .map(|name| Dialect::from_name_or_default(&name))
            .unwrap_or_default();
        let mut config = Self::new(client);

        if let Some(host) = lookup("MUNCH_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("MUNCH_PORT") {
            config.port = port.trim().parse().map_err(|_| {
                MunchError::validation(format!("MUNCH_PORT is not a valid port: {port}"))
            })?;
        }
        if let Some(user) = lookup("MUNCH_USER") {
            config.user = user;
        }
        if let Some(pass) = lookup("MUNCH_PASS") {
            config.pass = pass;
        }
        if let Some(db_name) = lookup("MUNCH_DB_NAME") {
            config.db_name = db_name;
        }
        if let Some(ssl_mode) = lookup("MUNCH_SSL_MODE") {
            config.ssl_mode = ssl_mode;
        }
        if let Some(elision) = lookup("MUNCH_ELISION") {
            config.elision = elision.parse()?;
        }
        Ok(config)
    }

    /// Driver connection string for the configured client.
    ///
    /// Postgres uses the libpq key/value form, quoting values that are empty
    /// or contain whitespace, `'` or `\`; MySQL uses the
    /// `user:pass@tcp(host:port)/db` DSN form. Connections are opened from
    /// [`SqlConfig::pg_config`], not from this string.
    pub fn connection_string(&self) -> String {
        match self.client {
            Dialect::Postgres => format!(
                "host={} port={} user={} password={} dbname={} sslmode={}",
                pg_quote(&self.host),
                self.port,
                pg_quote(&self.user),
                pg_quote(&self.pass),
                pg_quote(&self.db_name),
                pg_quote(&self.ssl_mode)
            ),
            Dialect::MySql => format!(
                "{}:{}@tcp({}:{})/{}",
                self.user, self.pass, self.host, self.port, self.db_name
            ),
        }
    }

    /// Typed Postgres driver configuration.
    ///
    /// Empty `user`, `pass` and `db_name` are left unset so the driver applies
    /// its own defaults. An unknown `ssl_mode` is a validation error.
    pub fn pg_config(&self) -> MunchResult<tokio_postgres::Config> {
        if self.client != Dialect::Postgres {
            return Err(MunchError::Connection(format!(
                "no bundled driver for {}; implement munch::Connection for your client",
                self.client
            )));
        }

        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .ssl_mode(parse_ssl_mode(&self.ssl_mode)?);
        if !self.user.is_empty() {
            config.user(&self.user);
        }
        if !self.pass.is_empty() {
            config.password(&self.pass);
        }
        if !self.db_name.is_empty() {
            config.dbname(&self.db_name);
        }
        Ok(config)
    }
}

fn parse_ssl_mode(mode: &str) -> MunchResult<SslMode> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "disable" => Ok(SslMode::Disable),
        "prefer" => Ok(SslMode::Prefer),
        "require" => Ok(SslMode::Require),
        _ => Err(MunchError::validation(format!("unsupported sslmode: {mode:?}"))),
    }
}

/// Quote a libpq key/value parameter when the bare form would misparse.
fn pg_quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}
