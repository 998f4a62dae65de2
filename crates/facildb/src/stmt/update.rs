//! UPDATE statement builder.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::monitor::QueryType;
use crate::stmt::param::ParamList;
use crate::stmt::traits::{BuildStatement, Execute};
use crate::stmt::writer::{SqlWriter, require, split_columns};
use tokio_postgres::types::ToSql;

/// UPDATE before its SET columns are known. Call [`UpdateTable::fields`] next.
pub struct UpdateTable<'c, C> {
    client: &'c C,
    table: String,
}

impl<'c, C: GenericClient> UpdateTable<'c, C> {
    pub(crate) fn new(client: &'c C, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    /// Set the columns to update (comma-separated).
    pub fn fields(self, columns: &str) -> UpdateStmt<'c, C> {
        UpdateStmt {
            client: self.client,
            table: self.table,
            columns: columns.to_string(),
            filter: None,
            params: ParamList::new(),
        }
    }
}

/// `UPDATE <table> SET c1 = $1, ... [WHERE ..]`
///
/// Parameters bind SET values first, in column order, then WHERE values.
pub struct UpdateStmt<'c, C> {
    client: &'c C,
    table: String,
    columns: String,
    filter: Option<String>,
    params: ParamList,
}

impl<'c, C: GenericClient> UpdateStmt<'c, C> {
    /// Set the WHERE fragment. `?` marks a parameter.
    pub fn where_(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// Alias for [`where_`](Self::where_).
    pub fn filter(self, filter: &str) -> Self {
        self.where_(filter)
    }

    /// Bind the next value (SET values first, then WHERE values).
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

impl<'c, C: GenericClient> BuildStatement<'c> for UpdateStmt<'c, C> {
    type Client = C;

    fn client(&self) -> &'c C {
        self.client
    }

    fn query_type(&self) -> QueryType {
        QueryType::Update
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()> {
        require(&self.table, "UPDATE table name")?;
        let columns = split_columns(&self.columns)?;

        w.push("UPDATE ").push(&self.table).push(" SET ");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(column).push(" = ").push_placeholder();
        }

        if let Some(filter) = &self.filter {
            require(filter, "WHERE clause")?;
            w.push(" WHERE ").push_fragment(filter);
        }
        Ok(())
    }

    fn into_params(self) -> ParamList {
        self.params
    }
}

impl<'c, C: GenericClient> Execute<'c> for UpdateStmt<'c, C> {}
