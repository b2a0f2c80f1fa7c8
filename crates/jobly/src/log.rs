//! SQL debug logging.
//!
//! With the `tracing` feature enabled, every model statement is emitted at
//! DEBUG under the `jobly.sql` target before it runs. Without the feature
//! these are no-ops.

use crate::error::JoblyError;

/// Statements longer than this (in bytes) are truncated in log output.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) const MAX_SQL_LENGTH: usize = 200;

/// Truncate to at most `max_bytes`, backing off to a char boundary.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
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

pub(crate) fn log_sql(tag: &str, sql: &str, param_count: usize) {
    #[cfg(feature = "tracing")]
    {
        let shown = truncate_sql_bytes(sql, MAX_SQL_LENGTH);
        let truncated = shown.len() < sql.len();
        tracing::debug!(
            target: "jobly.sql",
            tag,
            param_count,
            truncated,
            sql = %shown,
            "sql"
        );
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (tag, sql, param_count);
}

/// Log input rejected before any SQL ran.
pub(crate) fn log_rejected(tag: &str, err: &JoblyError) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "jobly.sql", tag, error = %err, "rejected");
    #[cfg(not(feature = "tracing"))]
    let _ = (tag, err);
}
