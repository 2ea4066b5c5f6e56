//! Round trip against a real Postgres server.
//!
//! Skipped unless `DATABASE_URL` is set (a `.env` file is honoured).

use munch::{Dialect, ElisionPolicy, MunchError, MunchResult, QueryBuilder, Record};
use tokio_postgres::NoTls;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Group {
    #[munch(column = "GroupId")]
    gid: i64,
    #[munch(column = "GroupName")]
    name: String,
    #[munch(column = "Active")]
    active: bool,
}

#[tokio::test]
async fn postgres_round_trip() -> MunchResult<()> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping postgres_round_trip");
            return Ok(());
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(|e| MunchError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    let table = format!("munch_groups_{}", std::process::id());
    client
        .batch_execute(&format!(
            r#"CREATE TEMP TABLE "{table}" ("GroupId" BIGINT PRIMARY KEY, "GroupName" TEXT NOT NULL, "Active" BOOLEAN NOT NULL)"#
        ))
        .await?;

    let db = QueryBuilder::new(client, Dialect::Postgres);
    let groups = [
        Group {
            gid: 5,
            name: "Test Group 5".into(),
            active: true,
        },
        Group {
            gid: 6,
            name: "O'Neil's".into(),
            active: false,
        },
    ];
    for group in &groups {
        let mut q = db.table(&table);
        q.insert(group);
        assert_eq!(db.exec(&q).await?, 1);
    }

    let mut q = db.table(&table);
    q.where_in("GroupId", vec![5, 6], false);
    let mut found: Vec<Group> = Vec::new();
    assert_eq!(db.exec_collect(&q, &mut found).await?, 2);
    found.sort_by_key(|g| g.gid);
    assert_eq!(found, groups);

    let mut q = db.table(&table);
    q.with_elision(ElisionPolicy::ZeroValue).update(&Group {
        name: "Renamed".into(),
        ..Default::default()
    })
    .where_raw("GroupId", "=", 5);
    assert_eq!(db.exec(&q).await?, 1);

    let mut q = db.table(&table);
    q.del().where_raw("GroupName", "=", "Renamed");
    assert_eq!(db.exec(&q).await?, 1);

    Ok(())
}
