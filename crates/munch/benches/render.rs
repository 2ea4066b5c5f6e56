use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use munch::{Dialect, Query, Record};

#[derive(Debug, Default, Record)]
struct User {
    #[munch(column = "userId")]
    id: i64,
    username: String,
    email: String,
    score: f64,
    active: bool,
}

fn user(i: i64) -> User {
    User {
        id: i,
        username: format!("user{i}"),
        email: format!("user{i}@example.com"),
        score: i as f64 * 1.5,
        active: i % 2 == 0,
    }
}

fn bench_where_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/where_chain");

    for n in [1, 5, 10, 50] {
        let mut q = Query::new("Users", Dialect::Postgres);
        for i in 0..n {
            q.where_raw(&format!("col{i}"), "=", i);
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_sql()));
        });
    }

    group.finish();
}

fn bench_where_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/where_in");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut q = Query::new("Users", Dialect::MySql);
                q.where_in("userId", values, false);
                black_box(q.to_sql());
            });
        });
    }

    group.finish();
}

fn bench_record_insert(c: &mut Criterion) {
    c.bench_function("render/record_insert", |b| {
        let record = user(7);
        b.iter(|| {
            let mut q = Query::new("Users", Dialect::Postgres);
            q.insert(&record);
            black_box(q.to_sql());
        });
    });
}

fn bench_where_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/where_records");

    for n in [1, 10, 50] {
        let records: Vec<User> = (0..n).map(user).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| {
                let mut q = Query::new("Users", Dialect::Postgres);
                q.where_records(records);
                black_box(q.to_sql());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_where_chain,
    bench_where_in,
    bench_record_insert,
    bench_where_records
);
criterion_main!(benches);
