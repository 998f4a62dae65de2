//! Trait definitions shared by the statement builders.

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::monitor::{QueryType, SqlLog};
use crate::record::{self, Record, RecordList, ValueKind};
use crate::stmt::param::ParamList;
use crate::stmt::writer::SqlWriter;
use serde::de::DeserializeOwned;
use tokio_postgres::Row;
use tokio_postgres::types::Type;

/// An assembled statement: SQL text with `$n` placeholders plus its parameters.
#[derive(Debug)]
pub struct Statement {
    sql: String,
    params: ParamList,
    query_type: QueryType,
}

impl Statement {
    /// Pair assembled SQL with its parameters, checking that every placeholder
    /// has exactly one value.
    pub fn new(writer: SqlWriter, params: ParamList, query_type: QueryType) -> DbResult<Self> {
        let (sql, placeholders) = writer.finish();
        if placeholders != params.len() {
            return Err(DbError::ParamCount {
                expected: placeholders,
                got: params.len(),
            });
        }
        Ok(Self {
            sql,
            params,
            query_type,
        })
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound parameters, in placeholder order.
    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// The kind of statement.
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub(crate) async fn execute_on<C: GenericClient>(self, client: &C) -> DbResult<u64> {
        let log = SqlLog::start(
            client.sql_log(),
            self.query_type,
            &self.sql,
            self.params.len(),
        );
        let params = self.params.as_refs();
        match client.execute(&self.sql, &params).await {
            Ok(affected) => {
                log.finish(affected);
                Ok(affected)
            }
            Err(e) => {
                log.fail(&e);
                Err(e)
            }
        }
    }

    pub(crate) async fn query_on<C: GenericClient>(self, client: &C) -> DbResult<Vec<Row>> {
        let log = SqlLog::start(
            client.sql_log(),
            self.query_type,
            &self.sql,
            self.params.len(),
        );
        let params = self.params.as_refs();
        match client.query(&self.sql, &params).await {
            Ok(rows) => {
                log.finish(rows.len() as u64);
                Ok(rows)
            }
            Err(e) => {
                log.fail(&e);
                Err(e)
            }
        }
    }
}

/// Base trait for all statement builders.
///
/// A builder knows its connection, writes its SQL into a [`SqlWriter`] and hands
/// over its parameters. Terminal operations live on [`Execute`] and [`Fetch`].
pub trait BuildStatement<'c>: Sized + Send {
    /// The connection type this builder is bound to.
    type Client: GenericClient + 'c;

    /// The connection passed to the builder's constructor.
    fn client(&self) -> &'c Self::Client;

    /// The kind of statement this builder produces.
    fn query_type(&self) -> QueryType;

    /// Write the statement text, failing on incomplete configuration.
    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()>;

    /// Hand over the accumulated parameters.
    fn into_params(self) -> ParamList;

    /// Assembled SQL (for debugging). Does not check parameter count.
    fn to_sql(&self) -> DbResult<String> {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w)?;
        Ok(w.finish().0)
    }

    /// Assemble the statement and detach it from the builder.
    fn build(self) -> DbResult<(&'c Self::Client, Statement)> {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w)?;
        let client = self.client();
        let query_type = self.query_type();
        let statement = Statement::new(w, self.into_params(), query_type)?;
        Ok((client, statement))
    }
}

/// Terminal operation for statements that change data or schema.
pub trait Execute<'c>: BuildStatement<'c> {
    /// Execute and return the affected row count.
    fn execute(self) -> impl std::future::Future<Output = DbResult<u64>> + Send {
        async move {
            let (client, statement) = self.build()?;
            statement.execute_on(client).await
        }
    }
}

/// Terminal operations for statements that return rows.
pub trait Fetch<'c>: BuildStatement<'c> {
    /// Execute and return the raw rows.
    fn fetch_rows(self) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send {
        async move {
            let (client, statement) = self.build()?;
            statement.query_on(client).await
        }
    }

    /// Execute and return every row as a record. Zero rows is not an error.
    fn query(self) -> impl std::future::Future<Output = DbResult<RecordList>> + Send {
        async move {
            let rows = self.fetch_rows().await?;
            record::rows_to_records(&rows)
        }
    }

    /// Execute and deserialize every row into `T`.
    fn query_as<T: DeserializeOwned + Send>(
        self,
    ) -> impl std::future::Future<Output = DbResult<Vec<T>>> + Send {
        async move {
            let records = self.query().await?;
            records.into_iter().map(record::from_record).collect()
        }
    }

    /// Execute and require **exactly one** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`DbError::NotFound`]
    /// - 1 row: returns that row
    /// - multiple rows: returns [`DbError::TooManyRows`]
    fn query_unique(self) -> impl std::future::Future<Output = DbResult<Record>> + Send {
        async move {
            let row = exactly_one(self.fetch_rows().await?)?;
            record::row_to_record(&row)
        }
    }

    /// Execute and return the **first** row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns the first row (does **not** error)
    fn query_first(self) -> impl std::future::Future<Output = DbResult<Option<Record>>> + Send {
        async move {
            let rows = self.fetch_rows().await?;
            rows.first().map(record::row_to_record).transpose()
        }
    }

    /// Execute a statement producing a single integer (e.g. `count(*)`).
    ///
    /// Fails with [`DbError::ShapeMismatch`] unless the result is exactly one row
    /// with exactly one non-null `int2`/`int4`/`int8` column.
    fn query_count(self) -> impl std::future::Future<Output = DbResult<i64>> + Send {
        async move {
            let rows = self.fetch_rows().await?;
            count_from_rows(&rows)
        }
    }
}

/// The single item of `items`: none is [`DbError::NotFound`], several is
/// [`DbError::TooManyRows`].
pub(crate) fn exactly_one<T>(items: Vec<T>) -> DbResult<T> {
    let got = items.len();
    let mut items = items.into_iter();
    match (items.next(), got) {
        (Some(item), 1) => Ok(item),
        (None, _) => Err(DbError::not_found("Expected 1 row, got 0")),
        _ => Err(DbError::too_many_rows(1, got)),
    }
}

/// Only integer columns can hold a count.
pub(crate) fn check_count_type(column: &str, ty: &Type) -> DbResult<()> {
    if ValueKind::of(ty).is_some_and(ValueKind::is_integer) {
        return Ok(());
    }
    Err(DbError::shape_mismatch(format!(
        "count column '{}' has non-integer type {}",
        column,
        ty.name()
    )))
}

fn count_from_rows(rows: &[Row]) -> DbResult<i64> {
    let row = match rows {
        [row] => row,
        _ => {
            return Err(DbError::shape_mismatch(format!(
                "count expects exactly 1 row, got {}",
                rows.len()
            )));
        }
    };

    let [column] = row.columns() else {
        return Err(DbError::shape_mismatch(format!(
            "count expects exactly 1 column, got {}",
            row.columns().len()
        )));
    };

    let ty = column.type_();
    check_count_type(column.name(), ty)?;

    let decode = |e: tokio_postgres::Error| DbError::decode(column.name(), e.to_string());
    let value = match ty.name() {
        "int2" => row.try_get::<_, Option<i16>>(0).map_err(decode)?.map(i64::from),
        "int4" => row.try_get::<_, Option<i32>>(0).map_err(decode)?.map(i64::from),
        _ => row.try_get::<_, Option<i64>>(0).map_err(decode)?,
    };
    value.ok_or_else(|| DbError::shape_mismatch(format!("count column '{}' is NULL", column.name())))
}
