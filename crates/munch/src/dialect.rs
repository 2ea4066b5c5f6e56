//! SQL dialects: the quoting characters used when rendering statements.

use crate::error::{MunchError, MunchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported SQL backend.
///
/// | Dialect    | Identifier quote | String quote |
/// |------------|------------------|--------------|
/// | `MySql`    | `` ` ``          | `"`          |
/// | `Postgres` | `"`              | `'`          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Backtick identifiers, double-quoted strings. Also the fallback for unknown names.
    #[default]
    MySql,
    /// Double-quoted identifiers, single-quoted strings.
    Postgres,
}

impl Dialect {
    /// Quote character wrapped around table and column names.
    pub const fn identifier_quote(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres => '"',
        }
    }

    /// Quote character wrapped around string literals.
    pub const fn string_quote(self) -> char {
        match self {
            Dialect::MySql => '"',
            Dialect::Postgres => '\'',
        }
    }

    /// Quote a table or column name. Embedded quote characters are doubled.
    pub fn quote_ident(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_ident(&mut out, name);
        out
    }

    /// Quote a string literal. Embedded quote characters are doubled.
    ///
    /// MySQL treats `\` as an escape character inside string literals (unless
    /// `NO_BACKSLASH_ESCAPES` is set), so backslashes are doubled there too.
    pub fn quote_str(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        let escape_backslash = matches!(self, Dialect::MySql);
        write_quoted(&mut out, s, self.string_quote(), escape_backslash);
        out
    }

    pub(crate) fn write_ident(self, out: &mut String, name: &str) {
        write_quoted(out, name, self.identifier_quote(), false);
    }

    /// Resolve a dialect name, falling back to [`Dialect::MySql`] when the name is unknown.
    ///
    /// This is the lenient selection policy used for process configuration: a typo in the
    /// configured client never fails construction, it selects the default dialect and logs a
    /// warning. Use [`str::parse`] for strict parsing.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(
                target: "munch.config",
                dialect = name,
                fallback = %Dialect::default(),
                "unknown SQL dialect, using fallback"
            );
            Dialect::default()
        })
    }
}

fn write_quoted(out: &mut String, s: &str, quote: char, escape_backslash: bool) {
    out.push(quote);
    for ch in s.chars() {
        if ch == quote || (escape_backslash && ch == '\\') {
            out.push(ch);
        }
        out.push(ch);
    }
    out.push(quote);
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for Dialect {
    type Err = MunchError;

    fn from_str(s: &str) -> MunchResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "m" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" | "p" => Ok(Dialect::Postgres),
            _ => Err(MunchError::validation(format!("unknown SQL dialect: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_quoting() {
        assert_eq!(Dialect::MySql.quote_ident("users"), "`users`");
        assert_eq!(Dialect::MySql.quote_str("Test"), "\"Test\"");
    }

    #[test]
    fn postgres_quoting() {
        assert_eq!(Dialect::Postgres.quote_ident("users"), "\"users\"");
        assert_eq!(Dialect::Postgres.quote_str("Test"), "'Test'");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(Dialect::Postgres.quote_str("O'Brien"), "'O''Brien'");
        assert_eq!(Dialect::MySql.quote_str("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(Dialect::MySql.quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn mysql_strings_escape_backslashes() {
        assert_eq!(Dialect::MySql.quote_str(r"C:\tmp"), r#""C:\\tmp""#);
        // a trailing backslash cannot swallow the doubled quote
        assert_eq!(Dialect::MySql.quote_str(r#"\""#), r#""\\""""#);
        assert_eq!(Dialect::Postgres.quote_str(r"C:\tmp"), r"'C:\tmp'");
        assert_eq!(Dialect::MySql.quote_ident(r"a\b"), r"`a\b`");
    }

    #[test]
    fn strict_parse() {
        assert_eq!("Postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("m".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn unknown_name_falls_back_to_mysql() {
        assert_eq!(Dialect::from_name_or_default("oracle"), Dialect::MySql);
        assert_eq!(Dialect::from_name_or_default("pg"), Dialect::Postgres);
    }
}
