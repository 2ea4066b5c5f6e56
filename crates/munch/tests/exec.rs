use munch::{
    Connection, Dialect, MunchError, MunchResult, Query, QueryBuilder, Record, RowSet, Value,
    extract,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Connection that records every statement and replays canned result sets.
#[derive(Default)]
struct Recorder {
    statements: Mutex<Vec<String>>,
    results: Mutex<VecDeque<RowSet>>,
    affected: u64,
}

impl Recorder {
    fn with_results(results: impl IntoIterator<Item = RowSet>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            ..Default::default()
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

impl Connection for Recorder {
    async fn query(&self, sql: &str) -> MunchResult<RowSet> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, sql: &str) -> MunchResult<u64> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(self.affected)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct LunaUser {
    #[munch(column = "userId")]
    user_id: i64,
    username: String,
    salt: String,
    email: String,
    password: String,
}

fn alice() -> LunaUser {
    LunaUser {
        user_id: 1,
        username: "alice".into(),
        salt: "s4lt".into(),
        email: "alice@example.com".into(),
        password: "hash".into(),
    }
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// A result set holding `records` as rows, with columns in schema order.
fn rows_of<T: Record>(records: &[T]) -> RowSet {
    let columns = munch::columns_of::<T>()
        .into_iter()
        .map(String::from)
        .collect();
    let rows = records
        .iter()
        .map(|r| extract(r).into_iter().map(|(_, v)| v).collect())
        .collect();
    RowSet::new(columns, rows)
}

#[tokio::test]
async fn exec_sends_rendered_sql() -> MunchResult<()> {
    let conn = Recorder {
        affected: 3,
        ..Default::default()
    };
    let mut q = Query::new("Users", Dialect::Postgres);
    q.del().where_in("userId", vec![1, 2, 3], false);

    assert_eq!(q.exec(&conn).await?, 3);
    assert_eq!(
        conn.statements(),
        vec![r#"DELETE FROM "Users" WHERE "userId" IN (1, 2, 3);"#.to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn invalid_write_is_never_sent() {
    let conn = Recorder::default();
    let mut q = Query::new("Users", Dialect::Postgres);
    q.insert(&LunaUser::default());

    let err = q.exec(&conn).await.unwrap_err();
    assert!(matches!(err, MunchError::Validation(_)));
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn exec_into_without_rows_leaves_target_untouched() -> MunchResult<()> {
    let conn = Recorder::default();
    let mut q = Query::new("Users", Dialect::Postgres);
    q.where_raw("email", "=", "nobody@example.com");

    let mut target = alice();
    assert!(!q.exec_into(&conn, &mut target).await?);
    assert_eq!(target, alice());
    Ok(())
}

#[tokio::test]
async fn exec_into_decodes_first_row() -> MunchResult<()> {
    let bob = LunaUser {
        user_id: 2,
        username: "bob".into(),
        ..alice()
    };
    let conn = Recorder::with_results([rows_of(&[alice(), bob])]);
    let q = Query::new("Users", Dialect::Postgres);

    let mut target = LunaUser::default();
    assert!(q.exec_into(&conn, &mut target).await?);
    assert_eq!(target, alice());
    Ok(())
}

#[tokio::test]
async fn exec_collect_appends_good_rows_and_reports_bad_ones() {
    let rows = RowSet::new(
        cols(&["userId", "username"]),
        vec![
            vec![Value::Int(1), Value::Text("alice".into())],
            vec![Value::Text("oops".into()), Value::Text("bob".into())],
            vec![Value::Int(3), Value::Text("carol".into())],
        ],
    );
    let conn = Recorder::with_results([rows]);
    let q = Query::new("Users", Dialect::Postgres);

    let mut out = vec![LunaUser::default()];
    let err = q.exec_collect(&conn, &mut out).await.unwrap_err();

    assert_eq!(
        out.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["", "alice", "carol"]
    );
    let failures = err.row_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].row, 1);
    assert!(failures[0].source.is_decode());
}

#[tokio::test]
async fn unknown_column_fails_the_row() {
    let rows = RowSet::new(cols(&["nickname"]), vec![vec![Value::Text("al".into())]]);
    let conn = Recorder::with_results([rows]);
    let q = Query::new("Users", Dialect::Postgres);

    let err = q.fetch_all::<LunaUser>(&conn).await.unwrap_err();
    assert_eq!(err.row_failures().len(), 1);
}

#[tokio::test]
async fn insert_then_select_round_trips() -> MunchResult<()> {
    let user = alice();
    let conn = Recorder::with_results([rows_of(std::slice::from_ref(&user))]);
    let db = QueryBuilder::new(&conn, Dialect::Postgres);

    let mut insert = db.table("Users");
    insert.insert(&user);
    db.exec(&insert).await?;

    let mut select = db.table("Users");
    select
        .select_record::<LunaUser>()
        .where_raw("userId", "=", user.user_id);
    let found: Option<LunaUser> = db.fetch_opt(&select).await?;

    assert_eq!(found, Some(user));
    assert_eq!(
        conn.statements(),
        vec![
            r#"INSERT INTO "Users" ("userId", "username", "salt", "email", "password") VALUES (1, 'alice', 's4lt', 'alice@example.com', 'hash');"#.to_string(),
            r#"SELECT "userId", "username", "salt", "email", "password" FROM "Users" WHERE "userId" = 1;"#.to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn builder_applies_its_dialect_and_policy() -> MunchResult<()> {
    let conn = Recorder::default();
    let db = QueryBuilder::new(conn, Dialect::MySql).with_elision(munch::ElisionPolicy::ZeroValue);

    let mut q = db.table("Users");
    q.where_raw("userId", "=", 0).where_raw("username", "=", "alice");
    let users: Vec<LunaUser> = db.fetch_all(&q).await?;

    assert!(users.is_empty());
    assert_eq!(
        db.connection().statements(),
        vec!["SELECT * FROM `Users` WHERE `username` = \"alice\";".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn unreadable_cell_fails_only_its_row() {
    let mut rows = RowSet::new(cols(&["userId"]), vec![vec![Value::Int(1)]]);
    rows.push_failed_row(munch::CellError::new("price", "unsupported column type interval"));
    rows.push_row(vec![Value::Int(3)]);
    let conn = Recorder::with_results([rows]);
    let q = Query::new("Users", Dialect::Postgres);

    let mut out = Vec::new();
    let err = q.exec_collect::<LunaUser>(&conn, &mut out).await.unwrap_err();

    assert_eq!(out.iter().map(|u| u.user_id).collect::<Vec<_>>(), vec![1, 3]);
    let failures = err.row_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].row, 1);
    assert!(failures[0].source.to_string().contains("price"));
}
