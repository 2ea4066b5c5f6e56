//! The statement builder.
//!
//! A [`Query`] accumulates a target table, an operation, a column selection,
//! filters and staged data, and renders them into literal SQL text.
//!
//! ```rust
//! use munch::{Dialect, Query};
//!
//! let mut q = Query::new("UserGroups", Dialect::Postgres);
//! q.where_in("GroupId", vec![1, 2, 3, 4], false);
//! assert_eq!(
//!     q.to_sql(),
//!     r#"SELECT * FROM "UserGroups" WHERE "GroupId" IN (1, 2, 3, 4);"#
//! );
//! ```

use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::{MunchError, MunchResult};
use crate::format::ElisionPolicy;
use crate::predicate::{Filter, PredicateSet};
use crate::record::{self, Record};
use crate::scan::{self, ScanOutcome};
use crate::value::{ToValue, Value};
use std::fmt;


/// Statement kind. Decides which clauses are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Select => write!(f, "SELECT"),
            Operation::Insert => write!(f, "INSERT"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// A mutable SQL statement under construction.
///
/// Mutators return `&mut Self` so calls can be chained. Rendering is a pure
/// read of the current state: mutating after [`Query::to_sql`] simply changes
/// the next render.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    operation: Operation,
    /// SELECT columns (empty means `*`)
    columns: Vec<String>,
    predicates: PredicateSet,
    /// Staged column values for INSERT/UPDATE, in first-staged order
    data: Vec<(String, Value)>,
    dialect: Dialect,
    elision: ElisionPolicy,
}

impl Query {
    /// Create a SELECT over `table`.
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            table: table.into(),
            operation: Operation::Select,
            columns: Vec::new(),
            predicates: PredicateSet::new(),
            data: Vec::new(),
            dialect,
            elision: ElisionPolicy::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn elision(&self) -> ElisionPolicy {
        self.elision
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// Staged `(column, value)` pairs.
    pub fn data(&self) -> &[(String, Value)] {
        &self.data
    }

    /// Override the elision policy for this statement.
    pub fn with_elision(&mut self, policy: ElisionPolicy) -> &mut Self {
        self.elision = policy;
        self
    }

    // ==================== Column selection ====================

    /// Set SELECT columns. An empty list selects `*`.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Select exactly the columns `T` maps.
    pub fn select_record<T: Record>(&mut self) -> &mut Self {
        self.select(record::columns_of::<T>())
    }

    // ==================== Filters ====================

    /// Append a filter. Neither the column nor the comparator is validated.
    pub fn add_filter(
        &mut self,
        column: impl Into<String>,
        comparator: impl Into<String>,
        value: Value,
        disjunctive: bool,
    ) -> &mut Self {
        self.predicates
            .push(Filter::new(column, comparator, value, disjunctive));
        self
    }

    /// Add an AND-joined condition: `column <comparator> value`.
    pub fn where_raw<T: ToValue>(&mut self, column: &str, comparator: &str, value: T) -> &mut Self {
        self.add_filter(column, comparator, value.to_value(), false)
    }

    /// Alias of [`Query::where_raw`].
    pub fn and_where_raw<T: ToValue>(
        &mut self,
        column: &str,
        comparator: &str,
        value: T,
    ) -> &mut Self {
        self.where_raw(column, comparator, value)
    }

    /// Add an OR-joined condition.
    pub fn or_where_raw<T: ToValue>(
        &mut self,
        column: &str,
        comparator: &str,
        value: T,
    ) -> &mut Self {
        self.add_filter(column, comparator, value.to_value(), true)
    }

    /// Add one AND-joined equality filter per field of `record`.
    ///
    /// Fields the elision policy omits (empty strings, `None`, ...) never
    /// render, so a partially filled record filters on the filled fields only.
    pub fn where_record<T: Record>(&mut self, record: &T) -> &mut Self {
        for (column, value) in record::extract(record) {
            self.add_filter(column, "=", value, false);
        }
        self
    }

    /// [`Query::where_record`] for each element. All filters are AND-joined.
    pub fn where_records<T: Record>(&mut self, records: &[T]) -> &mut Self {
        for record in records {
            self.where_record(record);
        }
        self
    }

    /// Add `column IN (values...)`.
    pub fn where_in<T: ToValue>(&mut self, column: &str, values: T, disjunctive: bool) -> &mut Self {
        self.add_filter(column, "IN", values.to_value(), disjunctive)
    }

    /// Add `column NOT IN (values...)`.
    pub fn where_not_in<T: ToValue>(
        &mut self,
        column: &str,
        values: T,
        disjunctive: bool,
    ) -> &mut Self {
        self.add_filter(column, "NOT IN", values.to_value(), disjunctive)
    }

    // ==================== Operations and data ====================

    /// Stage a single column value. Re-staging a column replaces its value in place.
    pub fn set<T: ToValue>(&mut self, column: &str, value: T) -> &mut Self {
        self.stage(column.to_string(), value.to_value());
        self
    }

    fn stage(&mut self, column: String, value: Value) {
        match self.data.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.data.push((column, value)),
        }
    }

    fn stage_record<T: Record>(&mut self, record: &T) {
        for (column, value) in record::extract(record) {
            self.stage(column.to_string(), value);
        }
    }

    /// Turn this into an INSERT and stage every field of `record`.
    pub fn insert<T: Record>(&mut self, record: &T) -> &mut Self {
        self.operation = Operation::Insert;
        self.stage_record(record);
        self
    }

    /// Turn this into an UPDATE and stage every field of `record`.
    pub fn update<T: Record>(&mut self, record: &T) -> &mut Self {
        self.operation = Operation::Update;
        self.stage_record(record);
        self
    }

    /// Turn this into a DELETE.
    pub fn delete(&mut self) -> &mut Self {
        self.operation = Operation::Delete;
        self
    }

    /// Alias of [`Query::delete`].
    pub fn del(&mut self) -> &mut Self {
        self.delete()
    }

    // ==================== Rendering ====================

    /// Staged data that survives elision, rendered.
    fn rendered_data(&self) -> Vec<(&str, String)> {
        self.data
            .iter()
            .filter_map(|(column, value)| {
                self.elision
                    .render(value, self.dialect)
                    .map(|literal| (column.as_str(), literal))
            })
            .collect()
    }

    /// Render the statement, terminated by `;`.
    pub fn to_sql(&self) -> String {
        let dialect = self.dialect;
        let mut sql = String::with_capacity(64);

        match self.operation {
            Operation::Select => {
                sql.push_str("SELECT ");
                if self.columns.is_empty() {
                    sql.push('*');
                } else {
                    for (i, column) in self.columns.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        dialect.write_ident(&mut sql, column);
                    }
                }
                sql.push_str(" FROM ");
                dialect.write_ident(&mut sql, &self.table);
            }
            Operation::Insert => {
                sql.push_str("INSERT INTO ");
                dialect.write_ident(&mut sql, &self.table);
                let data = self.rendered_data();
                if !data.is_empty() {
                    let mut values = String::new();
                    sql.push_str(" (");
                    for (i, (column, literal)) in data.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                            values.push_str(", ");
                        }
                        dialect.write_ident(&mut sql, column);
                        values.push_str(literal);
                    }
                    sql.push_str(") VALUES (");
                    sql.push_str(&values);
                    sql.push(')');
                }
            }
            Operation::Update => {
                sql.push_str("UPDATE ");
                dialect.write_ident(&mut sql, &self.table);
                let data = self.rendered_data();
                if !data.is_empty() {
                    sql.push_str(" SET ");
                    for (i, (column, literal)) in data.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        dialect.write_ident(&mut sql, column);
                        sql.push_str(" = ");
                        sql.push_str(literal);
                    }
                }
            }
            Operation::Delete => {
                sql.push_str("DELETE FROM ");
                dialect.write_ident(&mut sql, &self.table);
            }
        }

        if self.operation != Operation::Insert {
            self.predicates.render_into(&mut sql, dialect, self.elision);
        }

        sql.push(';');
        sql
    }

    /// Check the statement can be executed.
    ///
    /// INSERT and UPDATE must have at least one staged value that survives elision.
    pub fn validate(&self) -> MunchResult<()> {
        match self.operation {
            Operation::Insert | Operation::Update if self.rendered_data().is_empty() => {
                Err(MunchError::validation(format!(
                    "{} on {} has no values to write",
                    self.operation, self.table
                )))
            }
            _ => Ok(()),
        }
    }

    fn prepare(&self) -> MunchResult<String> {
        self.validate()?;
        let sql = self.to_sql();
        tracing::debug!(
            target: "munch.sql",
            operation = %self.operation,
            table = %self.table,
            sql = %truncate_for_log(&sql, MAX_LOGGED_SQL),
            "executing statement"
        );
        Ok(sql)
    }

    // ==================== Execution ====================

    /// Execute without reading rows back. Returns the affected row count.
    pub async fn exec(&self, conn: &impl Connection) -> MunchResult<u64> {
        let sql = self.prepare()?;
        conn.execute(&sql).await
    }

    /// Execute and decode the first returned row into `target`.
    ///
    /// Returns `false` and leaves `target` untouched when no rows come back.
    pub async fn exec_into<T: Record>(
        &self,
        conn: &impl Connection,
        target: &mut T,
    ) -> MunchResult<bool> {
        let sql = self.prepare()?;
        let (columns, rows) = conn.query(&sql).await?.into_parts();
        match rows.into_iter().next() {
            Some(row) => {
                scan::scan_into(&columns, row?, target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Execute and append every decodable row to `out`.
    ///
    /// Rows that fail to decode do not stop the others; they are reported
    /// together as [`MunchError::RowDecode`] after the good rows were appended.
    /// Returns the number of rows appended.
    pub async fn exec_collect<T: Record>(
        &self,
        conn: &impl Connection,
        out: &mut Vec<T>,
    ) -> MunchResult<usize> {
        let outcome = self.scan(conn).await?;
        let appended = outcome.records.len();
        out.extend(outcome.records);
        if outcome.failures.is_empty() {
            Ok(appended)
        } else {
            Err(MunchError::RowDecode(outcome.failures))
        }
    }

    /// Execute and decode all rows. Fails if any row fails.
    pub async fn fetch_all<T: Record>(&self, conn: &impl Connection) -> MunchResult<Vec<T>> {
        self.scan(conn).await?.into_result()
    }

    /// Execute and decode the first row, if any.
    pub async fn fetch_opt<T: Record>(&self, conn: &impl Connection) -> MunchResult<Option<T>> {
        let mut record = T::default();
        let found = self.exec_into(conn, &mut record).await?;
        Ok(found.then_some(record))
    }

    async fn scan<T: Record>(&self, conn: &impl Connection) -> MunchResult<ScanOutcome<T>> {
        let sql = self.prepare()?;
        let rows = conn.query(&sql).await?;
        let outcome = scan::scan_all::<T>(rows);
        for failure in &outcome.failures {
            tracing::warn!(
                target: "munch.sql",
                table = %self.table,
                row = failure.row,
                error = %failure.source,
                "row decode failed"
            );
        }
        Ok(outcome)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

const MAX_LOGGED_SQL: usize = 200;

/// Cut `sql` to at most `max_bytes`, on a char boundary, marking the cut with `...`.
fn truncate_for_log(sql: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if sql.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(sql);
    }
    let mut end = max_bytes;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!("{}...", &sql[..end]))
}
