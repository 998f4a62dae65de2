//! Statement classification and `tracing`-based SQL logging.
//!
//! Every terminal builder operation reports through [`SqlLog`]: one event before
//! the statement is sent (target `facildb.sql`) and one when it completes or fails.

use crate::config::SqlLogConfig;
use crate::error::DbError;
use std::time::{Duration, Instant};
use tracing::Level;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, custom)
    Other,
}

impl QueryType {
    /// Detect query type from a hand-written SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// Strip leading whitespace, SQL comments and parentheses to find the first keyword.
fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => s = &rest[pos + 1..],
                None => return "",
            }
            continue;
        }
        if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => s = &rest[pos + 2..],
                None => return "",
            }
            continue;
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            return s;
        }
    }
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let Some(head) = s.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    s[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// Logging scope for a single statement execution.
pub(crate) struct SqlLog {
    config: SqlLogConfig,
    query_type: QueryType,
    started: Instant,
}

impl SqlLog {
    /// Emit the "executing" event and start the clock.
    pub(crate) fn start(
        config: SqlLogConfig,
        query_type: QueryType,
        sql: &str,
        params: usize,
    ) -> Self {
        let shown = match config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        };
        emit_at_level!(
            config.level,
            target: "facildb.sql",
            query_type = ?query_type,
            params,
            sql = %shown,
            "executing statement"
        );
        Self {
            config,
            query_type,
            started: Instant::now(),
        }
    }

    /// Emit the completion event; slow statements are raised to WARN.
    pub(crate) fn finish(self, rows: u64) {
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        if self.is_slow(elapsed) {
            tracing::warn!(
                target: "facildb.sql",
                query_type = ?self.query_type,
                rows,
                elapsed_ms,
                "slow statement"
            );
        } else {
            emit_at_level!(
                self.config.level,
                target: "facildb.sql",
                query_type = ?self.query_type,
                rows,
                elapsed_ms,
                "statement finished"
            );
        }
    }

    /// Emit the failure event. The error itself is returned unchanged by the caller.
    pub(crate) fn fail(self, error: &DbError) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        tracing::warn!(
            target: "facildb.sql",
            query_type = ?self.query_type,
            elapsed_ms,
            error = %error,
            "statement failed"
        );
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.config
            .slow_query_threshold
            .is_some_and(|threshold| elapsed > threshold)
    }
}
