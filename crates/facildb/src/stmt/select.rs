//! SELECT statement builder.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::monitor::QueryType;
use crate::stmt::param::ParamList;
use crate::stmt::traits::{BuildStatement, Fetch};
use crate::stmt::writer::{SqlWriter, require};
use tokio_postgres::types::ToSql;

/// SELECT before its source table is known. Call [`SelectColumns::from`] next.
pub struct SelectColumns<'c, C> {
    client: &'c C,
    columns: String,
}

impl<'c, C: GenericClient> SelectColumns<'c, C> {
    pub(crate) fn new(client: &'c C, columns: &str) -> Self {
        Self {
            client,
            columns: columns.to_string(),
        }
    }

    /// Set the source table (or any FROM expression, e.g. `"book b"`).
    #[allow(clippy::should_implement_trait)]
    pub fn from(self, table: &str) -> SelectStmt<'c, C> {
        SelectStmt {
            client: self.client,
            columns: self.columns,
            table: table.to_string(),
            filter: None,
            order: None,
            limit: None,
            offset: None,
            params: ParamList::new(),
        }
    }
}

/// `SELECT <columns> FROM <table> [WHERE ..] [ORDER BY ..] [LIMIT n] [OFFSET n]`
pub struct SelectStmt<'c, C> {
    client: &'c C,
    columns: String,
    table: String,
    filter: Option<String>,
    order: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    params: ParamList,
}

impl<'c, C: GenericClient> SelectStmt<'c, C> {
    /// Set the WHERE fragment. `?` marks a parameter.
    pub fn where_(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// Alias for [`where_`](Self::where_).
    pub fn filter(self, filter: &str) -> Self {
        self.where_(filter)
    }

    /// Set the ORDER BY fragment.
    pub fn order_by(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
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

impl<'c, C: GenericClient> BuildStatement<'c> for SelectStmt<'c, C> {
    type Client = C;

    fn client(&self) -> &'c C {
        self.client
    }

    fn query_type(&self) -> QueryType {
        QueryType::Select
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbResult<()> {
        require(&self.columns, "SELECT column list")?;
        require(&self.table, "SELECT table name")?;

        w.push("SELECT ")
            .push_fragment(self.columns.trim())
            .push(" FROM ")
            .push(&self.table);

        if let Some(filter) = &self.filter {
            require(filter, "WHERE clause")?;
            w.push(" WHERE ").push_fragment(filter);
        }
        if let Some(order) = &self.order {
            require(order, "ORDER BY clause")?;
            w.push(" ORDER BY ").push_fragment(order);
        }
        if let Some(limit) = self.limit {
            w.push(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {}", offset));
        }
        Ok(())
    }

    fn into_params(self) -> ParamList {
        self.params
    }
}

impl<'c, C: GenericClient> Fetch<'c> for SelectStmt<'c, C> {}
