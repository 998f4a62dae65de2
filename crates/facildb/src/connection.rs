//! Owned database session.

use crate::client::GenericClient;
use crate::config::{DbConfig, SqlLogConfig};
use crate::error::{DbError, DbResult};
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// An open PostgreSQL session plus the background task driving it.
///
/// Open once with [`Connection::connect`], pass `&conn` to every statement
/// builder, and release it with [`Connection::close`]. Dropping the value also
/// releases the session, but without waiting for the driver task to finish.
///
/// # Example
///
/// ```ignore
/// let conn = Connection::connect(&DbConfig::from_env()?).await?;
/// let result = run(&conn).await;
/// conn.close().await?;
/// result
/// ```
pub struct Connection {
    client: tokio_postgres::Client,
    driver: JoinHandle<()>,
    sql_log: SqlLogConfig,
}

impl Connection {
    /// Open a session using `config`.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let pg = config.to_pg_config()?;
        let (client, connection) = pg
            .connect(NoTls)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "facildb.connection", error = %e, "connection driver exited with error");
            }
        });

        tracing::debug!(
            target: "facildb.connection",
            dbname = pg.get_dbname().unwrap_or("-"),
            "connection opened"
        );

        Ok(Self {
            client,
            driver,
            sql_log: config.sql_log,
        })
    }

    /// Access the underlying `tokio_postgres` client.
    pub fn client(&self) -> &tokio_postgres::Client {
        &self.client
    }

    /// Close the session and wait for the driver task to exit.
    pub async fn close(self) -> DbResult<()> {
        let Self { client, driver, .. } = self;
        drop(client);
        driver
            .await
            .map_err(|e| DbError::Connection(format!("connection driver task failed: {}", e)))?;
        tracing::debug!(target: "facildb.connection", "connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.client.is_closed())
            .field("sql_log", &self.sql_log)
            .finish()
    }
}

impl GenericClient for Connection {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        GenericClient::query(&self.client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        GenericClient::execute(&self.client, sql, params).await
    }

    fn sql_log(&self) -> SqlLogConfig {
        self.sql_log
    }
}
