//! Builder for caller-supplied SQL.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::monitor::QueryType;
use crate::stmt::param::ParamList;
use crate::stmt::traits::{BuildStatement, Execute, Fetch};
use crate::stmt::writer::{SqlWriter, require};
use tokio_postgres::types::ToSql;

/// A complete SQL statement written by the caller, with `?` placeholders.
///
/// Supports both [`Execute`] (DDL, DML) and [`Fetch`] (queries, counts).
pub struct RawStmt<'c, C> {
    client: &'c C,
    sql: String,
    params: ParamList,
}

impl<'c, C: GenericClient> RawStmt<'c, C> {
    pub(crate) fn new(client: &'c C, sql: String) -> Self {
        Self {
            client,
            sql,
            params: ParamList::new(),
        }
    }

    /// Bind the value for the next `?`.
    pub fn param<T: ToSql + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.params.push(value);
        self
    }

    /// Bind several values in order.
    pub fn params<T, I>(mut self, values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.params.push(value);
        }
        self
    }
}

impl<'c, C: GenericClient> BuildStatement<'c> for RawStmt<'c, C> {
    type Client = C;

    fn client(&self) -> &'c C {
        self.client
    }

    fn query_type(&self) -> QueryType {
        QueryType::from_sql(&self.sql)
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()> {
        require(&self.sql, "SQL statement")?;
        w.push_fragment(&self.sql);
        Ok(())
    }

    fn into_params(self) -> ParamList {
        self.params
    }
}

impl<'c, C: GenericClient> Execute<'c> for RawStmt<'c, C> {}

impl<'c, C: GenericClient> Fetch<'c> for RawStmt<'c, C> {}
