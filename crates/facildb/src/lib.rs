//! # facildb
//!
//! A small fluent SQL statement builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Fluent builders**: `insert` / `select` / `update` / `delete` / raw `sql`
//!   with chained `fields()`, `from()`, `where_()`, `order_by()`, `param()`
//! - **Positional parameters**: write `?` in fragments, values bind in order as `$1, $2, ...`
//! - **Mode-checked at compile time**: `fields()` only exists on INSERT/UPDATE, `from()` only on SELECT
//! - **JSON-shaped results**: rows come back as `serde_json` records, or as any `Deserialize` type
//! - **Explicit connections**: every builder borrows the connection it runs on
//! - **SQL logging**: every statement is reported through `tracing` (target `facildb.sql`)
//!
//! ## Example
//!
//! ```ignore
//! use facildb::prelude::*;
//!
//! let conn = Connection::connect(&DbConfig::from_env()?).await?;
//!
//! conn.insert("publisher")
//!     .fields("id, pub_name")
//!     .param(1000i64)
//!     .param("Wiley")
//!     .execute()
//!     .await?;
//!
//! let rec = conn
//!     .select("id, pub_name")
//!     .from("publisher")
//!     .where_("id = ?")
//!     .param(1000i64)
//!     .query_unique()
//!     .await?;
//! assert_eq!(rec["pub_name"], "Wiley");
//!
//! let total = conn.sql("select count(*) from publisher").query_count().await?;
//!
//! conn.close().await?;
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod monitor;
pub mod prelude;
pub mod record;
pub mod stmt;

pub use client::GenericClient;
pub use config::{DbConfig, SqlLogConfig};
pub use connection::Connection;
pub use error::{DbError, DbResult};
pub use monitor::QueryType;
pub use record::{Record, RecordList, from_record, row_to_record, rows_to_records};
pub use stmt::{
    BuildStatement, DeleteStmt, Execute, Fetch, InsertInto, InsertStmt, Param, ParamList, RawStmt,
    SelectColumns, SelectStmt, SqlWriter, Statement, StatementExt, UpdateStmt, UpdateTable, delete,
    insert, select, sql, update,
};
