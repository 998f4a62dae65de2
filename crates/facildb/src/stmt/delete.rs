//! DELETE statement builder.

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::monitor::QueryType;
use crate::stmt::param::ParamList;
use crate::stmt::traits::{BuildStatement, Execute};
use crate::stmt::writer::{SqlWriter, require};
use tokio_postgres::types::ToSql;

/// `DELETE FROM <table> WHERE ..`
///
/// A WHERE clause is required unless [`DeleteStmt::all_rows`] is called.
pub struct DeleteStmt<'c, C> {
    client: &'c C,
    table: String,
    filter: Option<String>,
    all_rows: bool,
    params: ParamList,
}

impl<'c, C: GenericClient> DeleteStmt<'c, C> {
    pub(crate) fn new(client: &'c C, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            filter: None,
            all_rows: false,
            params: ParamList::new(),
        }
    }

    /// Set the WHERE fragment. `?` marks a parameter.
    pub fn where_(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// Alias for [`where_`](Self::where_).
    pub fn filter(self, filter: &str) -> Self {
        self.where_(filter)
    }

    /// Allow the statement to run without a WHERE clause.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
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

impl<'c, C: GenericClient> BuildStatement<'c> for DeleteStmt<'c, C> {
    type Client = C;

    fn client(&self) -> &'c C {
        self.client
    }

    fn query_type(&self) -> QueryType {
        QueryType::Delete
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()> {
        require(&self.table, "DELETE table name")?;

        w.push("DELETE FROM ").push(&self.table);
        match &self.filter {
            Some(filter) => {
                require(filter, "WHERE clause")?;
                w.push(" WHERE ").push_fragment(filter);
            }
            None if self.all_rows => {}
            None => {
                return Err(DbError::builder(
                    "DELETE without WHERE; call all_rows() to delete every row",
                ));
            }
        }
        Ok(())
    }

    fn into_params(self) -> ParamList {
        self.params
    }
}

impl<'c, C: GenericClient> Execute<'c> for DeleteStmt<'c, C> {}
