//! WHERE predicate accumulator shared by the listing filters.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// Reusable WHERE clause builder.
///
/// Predicates are kept in the order they are added and joined with `AND`.
/// Every bound value gets the next `$n` placeholder; predicates without a
/// value (e.g. `equity > 0`) don't consume one.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    /// WHERE conditions (without leading AND)
    conditions: Vec<String>,
    values: Vec<SqlValue>,
    /// Current parameter counter (starts from offset)
    param_count: usize,
}

impl WhereBuilder {
    /// Create a new WhereBuilder with param numbering starting at 1.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create a new WhereBuilder with param numbering starting after `offset`.
    ///
    /// For example, `with_offset(2)` means the first param will be `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            values: Vec::new(),
            param_count: offset,
        }
    }

    /// Get current parameter count (including the offset).
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Check if any conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn add_condition(&mut self, col: &str, op: &str, value: SqlValue) {
        self.param_count += 1;
        self.conditions
            .push(format!("{} {} ${}", col, op, self.param_count));
        self.values.push(value);
    }

    /// Add AND >= condition.
    pub fn and_gte(&mut self, col: &str, val: impl Into<SqlValue>) -> &mut Self {
        self.add_condition(col, ">=", val.into());
        self
    }

    /// Add AND <= condition.
    pub fn and_lte(&mut self, col: &str, val: impl Into<SqlValue>) -> &mut Self {
        self.add_condition(col, "<=", val.into());
        self
    }

    /// Add AND ILIKE condition with a caller-supplied pattern.
    pub fn and_ilike(&mut self, col: &str, pattern: impl Into<String>) -> &mut Self {
        self.add_condition(col, "ILIKE", SqlValue::Text(pattern.into()));
        self
    }

    /// Add a case-insensitive substring match: `col ILIKE '%needle%'`.
    ///
    /// `%`, `_` and `\` inside `needle` match literally.
    pub fn and_contains(&mut self, col: &str, needle: &str) -> &mut Self {
        self.and_ilike(col, format!("%{}%", escape_like(needle)))
    }

    /// Add a raw WHERE condition without params.
    ///
    /// `sql` is copied into the statement verbatim, so it must never carry
    /// user input.
    pub(crate) fn and_raw(&mut self, sql: &str) -> &mut Self {
        self.conditions.push(sql.to_string());
        self
    }

    // ==================== Option-friendly helpers ====================

    pub fn and_gte_opt<T: Into<SqlValue>>(&mut self, col: &str, val: Option<T>) -> &mut Self {
        if let Some(v) = val {
            self.and_gte(col, v);
        }
        self
    }

    pub fn and_lte_opt<T: Into<SqlValue>>(&mut self, col: &str, val: Option<T>) -> &mut Self {
        if let Some(v) = val {
            self.and_lte(col, v);
        }
        self
    }

    pub fn and_contains_opt(&mut self, col: &str, needle: Option<&str>) -> &mut Self {
        if let Some(n) = needle {
            self.and_contains(col, n);
        }
        self
    }

    /// Finish, producing the `AND`-joined predicate list (without "WHERE").
    pub fn build(self) -> WhereClause {
        WhereClause {
            where_sql: self.conditions.join(" AND "),
            values: self.values,
        }
    }
}

/// Escape LIKE metacharacters so the text matches literally.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Compiled predicate list plus the values to bind.
///
/// `where_sql` is empty when no filter applied; callers then leave the WHERE
/// keyword out entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub where_sql: String,
    pub values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.where_sql.is_empty()
    }

    /// Append ` WHERE <predicates>` to `sql`, or nothing when empty.
    pub fn push_to(&self, sql: &mut String) {
        if !self.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_sql);
        }
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}
