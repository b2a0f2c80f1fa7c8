//! Quoted SQL identifiers.
//!
//! Column names are never bound as parameters (Postgres doesn't allow it), so
//! they are written into the statement text as quoted identifiers:
//! `"num_employees"`. Any `"` inside the name is escaped as `""`, which keeps a
//! hostile name from closing the identifier early.

use crate::error::{JoblyError, JoblyResult};

/// Validate a column name for use as a quoted identifier.
pub fn validate_column(name: &str) -> JoblyResult<()> {
    if name.is_empty() {
        return Err(JoblyError::bad_request("Column name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(JoblyError::bad_request(
            "Column name cannot contain NUL character",
        ));
    }
    Ok(())
}

/// Append `name` to `out` as a quoted identifier.
pub(crate) fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Render `name` as a quoted identifier.
pub fn quote_column(name: &str) -> JoblyResult<String> {
    validate_column(name)?;
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name);
    Ok(out)
}
