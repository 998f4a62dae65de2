use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use facildb::{BuildStatement, DbResult, GenericClient, SqlWriter, insert, select};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Never executed: builders only need a client to bind to.
struct NoClient;

impl GenericClient for NoClient {
    async fn query(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        Ok(Vec::new())
    }

    async fn execute(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        Ok(0)
    }
}

/// `col0 = ? AND col1 = ? ...`
fn filter(n: usize) -> String {
    (0..n)
        .map(|i| format!("col{i} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn columns(n: usize) -> String {
    (0..n)
        .map(|i| format!("col{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bench_select_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/select_build");
    let client = NoClient;

    for n in [1, 5, 10, 50, 100] {
        let filter = filter(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| {
                let stmt = select(&client, "*")
                    .from("t")
                    .where_(filter)
                    .order_by("col0")
                    .params(0..n as i64);
                black_box(stmt.build().map(|(_, s)| s.sql().len()))
            });
        });
    }

    group.finish();
}

fn bench_insert_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert_to_sql");
    let client = NoClient;

    for n in [1, 5, 10, 50, 100] {
        let columns = columns(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &columns, |b, columns| {
            let stmt = insert(&client, "t").fields(columns);
            b.iter(|| black_box(stmt.to_sql()));
        });
    }

    group.finish();
}

fn bench_fragment_with_literals(c: &mut Criterion) {
    let fragment = "a = ? AND b = 'what?' AND c = ? -- trailing?\n AND d = ? /* ?? */";
    c.bench_function("statement_builder/fragment_with_literals", |b| {
        b.iter(|| {
            let mut w = SqlWriter::new();
            w.push_fragment(black_box(fragment));
            black_box(w.finish())
        });
    });
}

criterion_group!(
    benches,
    bench_select_build,
    bench_insert_to_sql,
    bench_fragment_with_literals
);
criterion_main!(benches);
