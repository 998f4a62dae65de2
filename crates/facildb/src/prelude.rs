//! Convenient imports for typical `facildb` usage.
//!
//! ```ignore
//! use facildb::prelude::*;
//! ```

pub use crate::{
    BuildStatement, Connection, DbConfig, DbError, DbResult, Execute, Fetch, GenericClient,
    Record, RecordList, StatementExt, delete, insert, select, sql, update,
};
