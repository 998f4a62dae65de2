//! INSERT statement builder.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::monitor::QueryType;
use crate::stmt::param::ParamList;
use crate::stmt::traits::{BuildStatement, Execute};
use crate::stmt::writer::{SqlWriter, require, split_columns};
use tokio_postgres::types::ToSql;

/// INSERT before its column list is known. Call [`InsertInto::fields`] next.
pub struct InsertInto<'c, C> {
    client: &'c C,
    table: String,
}

impl<'c, C: GenericClient> InsertInto<'c, C> {
    pub(crate) fn new(client: &'c C, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    /// Set the value columns (comma-separated). One parameter is expected per column.
    pub fn fields(self, columns: &str) -> InsertStmt<'c, C> {
        InsertStmt {
            client: self.client,
            table: self.table,
            columns: columns.to_string(),
            params: ParamList::new(),
        }
    }
}

/// `INSERT INTO <table> (<columns>) VALUES ($1, ...)`
pub struct InsertStmt<'c, C> {
    client: &'c C,
    table: String,
    columns: String,
    params: ParamList,
}

impl<'c, C: GenericClient> InsertStmt<'c, C> {
    /// Bind the value for the next column.
    pub fn param<T: ToSql + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.params.push(value);
        self
    }

    /// Bind several values in column order.
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

impl<'c, C: GenericClient> BuildStatement<'c> for InsertStmt<'c, C> {
    type Client = C;

    fn client(&self) -> &'c C {
        self.client
    }

    fn query_type(&self) -> QueryType {
        QueryType::Insert
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()> {
        require(&self.table, "INSERT table name")?;
        let columns = split_columns(&self.columns)?;

        w.push("INSERT INTO ")
            .push(&self.table)
            .push(" (")
            .push(&columns.join(", "))
            .push(") VALUES (");
        for i in 0..columns.len() {
            if i > 0 {
                w.push(", ");
            }
            w.push_placeholder();
        }
        w.push(")");
        Ok(())
    }

    fn into_params(self) -> ParamList {
        self.params
    }
}

impl<'c, C: GenericClient> Execute<'c> for InsertStmt<'c, C> {}
