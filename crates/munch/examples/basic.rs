//! Basic usage example for munch
//!
//! Run with: cargo run --example basic -p munch
//!
//! Configure the connection in a .env file or environment variables:
//! MUNCH_CLIENT=postgres
//! MUNCH_HOST=localhost
//! MUNCH_USER=postgres
//! MUNCH_PASS=postgres
//! MUNCH_DB_NAME=munch_example

use munch::{ElisionPolicy, MunchError, Record, SqlConfig, connect};

#[derive(Debug, Default, Record)]
struct LunaUser {
    #[munch(column = "userId")]
    user_id: i64,
    username: String,
    salt: String,
    email: String,
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), MunchError> {
    dotenvy::dotenv().ok();

    // Zero ids count as "not provided", so partial records can be used as filters.
    let config = SqlConfig::from_env()?.with_elision(ElisionPolicy::ZeroValue);
    let db = connect(&config).await?;

    // Setup
    db.connection()
        .batch_execute(
            r#"CREATE TABLE IF NOT EXISTS "Users" (
                "userId" BIGINT PRIMARY KEY,
                username TEXT NOT NULL DEFAULT '',
                salt TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                password TEXT NOT NULL DEFAULT ''
            )"#,
        )
        .await?;
    let mut q = db.table("Users");
    q.del();
    db.exec(&q).await?;

    // ============================================
    // Insert from a record
    // ============================================
    println!("=== Insert ===");

    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        let mut q = db.table("Users");
        q.insert(&LunaUser {
            user_id: id,
            username: name.to_string(),
            email: format!("{name}@example.com"),
            ..Default::default()
        });
        println!("{q}");
        db.exec(&q).await?;
    }

    // ============================================
    // Select with a partial record as filter
    // ============================================
    println!("\n=== Select by record ===");

    let mut q = db.table("Users");
    q.where_record(&LunaUser {
        email: "bob@example.com".into(),
        ..Default::default()
    });
    println!("{q}");
    let mut bob = LunaUser::default();
    if db.exec_into(&q, &mut bob).await? {
        println!("Found: {bob:?}");
    }

    // ============================================
    // Select a column subset with IN
    // ============================================
    println!("\n=== Select with IN ===");

    let mut q = db.table("Users");
    q.select(["userId", "username"])
        .where_in("userId", vec![1, 3], false);
    println!("{q}");
    let users: Vec<LunaUser> = db.fetch_all(&q).await?;
    for user in &users {
        println!("  {} {}", user.user_id, user.username);
    }

    // ============================================
    // Update and delete
    // ============================================
    println!("\n=== Update / Delete ===");

    let mut q = db.table("Users");
    q.update(&LunaUser {
        username: "bobby".into(),
        ..Default::default()
    })
    .where_raw("userId", "=", 2);
    println!("{q}");
    println!("Updated {} row(s)", db.exec(&q).await?);

    let mut q = db.table("Users");
    q.del().where_not_in("userId", vec![1], false);
    println!("{q}");
    println!("Deleted {} row(s)", db.exec(&q).await?);

    Ok(())
}
