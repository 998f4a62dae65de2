//! Fluent statement builders.
//!
//! Each builder is bound to the connection passed to its constructor, collects
//! SQL fragments and positional parameters, and is consumed by exactly one
//! terminal operation:
//!
//! - [`Execute::execute`] for INSERT / UPDATE / DELETE / raw DDL and DML
//! - [`Fetch::query`], [`Fetch::query_unique`], [`Fetch::query_first`],
//!   [`Fetch::query_count`] for SELECT and raw queries
//!
//! # Usage
//!
//! ```ignore
//! use facildb::prelude::*;
//!
//! insert(&conn, "publisher")
//!     .fields("id, pub_name")
//!     .param(1000i64)
//!     .param("Wiley")
//!     .execute()
//!     .await?;
//!
//! let books = select(&conn, "title, author, isbn")
//!     .from("book")
//!     .where_("publisher_id = ?")
//!     .order_by("author")
//!     .param(1001i64)
//!     .query()
//!     .await?;
//!
//! update(&conn, "book")
//!     .fields("title")
//!     .where_("id = ?")
//!     .param("Drawing Cartoons the Easy Way")
//!     .param(2004i64)
//!     .execute()
//!     .await?;
//!
//! let total = sql(&conn, "select count(*) from book").query_count().await?;
//! ```
//!
//! Mode-specific calls only exist on the matching builder, so calling one on
//! the wrong kind of statement does not compile:
//!
//! ```compile_fail
//! use facildb::prelude::*;
//!
//! fn wrong_mode(conn: &facildb::Connection) {
//!     let _ = select(conn, "id").fields("title");
//! }
//! ```
//!
//! # Fragments are trusted
//!
//! Table names, column lists, WHERE and ORDER BY fragments are copied into the
//! statement as written. Only values passed through `param()` are bound
//! safely; never build fragments from untrusted input.

mod delete;
mod insert;
mod param;
mod raw;
mod select;
mod traits;
mod update;
mod writer;

pub use delete::DeleteStmt;
pub use insert::{InsertInto, InsertStmt};
pub use param::{Param, ParamList};
pub use raw::RawStmt;
pub use select::{SelectColumns, SelectStmt};
pub use traits::{BuildStatement, Execute, Fetch, Statement};
pub use update::{UpdateStmt, UpdateTable};
pub use writer::SqlWriter;

use crate::client::GenericClient;

/// Wrap a complete SQL statement. `?` marks a parameter.
///
/// # Example
/// ```ignore
/// let total = facildb::sql(&conn, "select count(*) from book").query_count().await?;
/// ```
pub fn sql<'c, C: GenericClient>(client: &'c C, statement: impl Into<String>) -> RawStmt<'c, C> {
    RawStmt::new(client, statement.into())
}

/// Start an INSERT into `table`.
///
/// # Example
/// ```ignore
/// facildb::insert(&conn, "publisher")
///     .fields("id, pub_name")
///     .param(1000i64)
///     .param("Wiley")
///     .execute()
///     .await?;
/// ```
pub fn insert<'c, C: GenericClient>(client: &'c C, table: &str) -> InsertInto<'c, C> {
    InsertInto::new(client, table)
}

/// Start a SELECT projecting `columns` (comma-separated or `*`).
///
/// # Example
/// ```ignore
/// let rec = facildb::select(&conn, "id, title")
///     .from("book")
///     .where_("id = ?")
///     .param(2004i64)
///     .query_unique()
///     .await?;
/// ```
pub fn select<'c, C: GenericClient>(client: &'c C, columns: &str) -> SelectColumns<'c, C> {
    SelectColumns::new(client, columns)
}

/// Start an UPDATE of `table`.
pub fn update<'c, C: GenericClient>(client: &'c C, table: &str) -> UpdateTable<'c, C> {
    UpdateTable::new(client, table)
}

/// Start a DELETE from `table`.
pub fn delete<'c, C: GenericClient>(client: &'c C, table: &str) -> DeleteStmt<'c, C> {
    DeleteStmt::new(client, table)
}

/// Method-style entry points on any client: `conn.insert("book")`.
pub trait StatementExt: GenericClient + Sized {
    /// See [`sql`].
    fn sql(&self, statement: impl Into<String>) -> RawStmt<'_, Self> {
        sql(self, statement)
    }

    /// See [`insert`].
    fn insert(&self, table: &str) -> InsertInto<'_, Self> {
        insert(self, table)
    }

    /// See [`select`].
    fn select(&self, columns: &str) -> SelectColumns<'_, Self> {
        select(self, columns)
    }

    /// See [`update`].
    fn update(&self, table: &str) -> UpdateTable<'_, Self> {
        update(self, table)
    }

    /// See [`delete`].
    fn delete(&self, table: &str) -> DeleteStmt<'_, Self> {
        delete(self, table)
    }
}

impl<C: GenericClient> StatementExt for C {}
