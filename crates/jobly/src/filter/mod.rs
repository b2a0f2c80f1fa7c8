//! Listing filters.
//!
//! Each entity declares the filters it recognizes and the order their
//! predicates are emitted in. Compiling a filter yields a [`WhereClause`]
//! whose `$n` placeholders line up with its value list.
//!
//! ```ignore
//! let filter = CompanyFilter { min_employees: Some(10), name: Some("net".into()), ..Default::default() };
//! let clause = filter.compile()?;
//! assert_eq!(clause.where_sql, "num_employees >= $1 AND name ILIKE $2");
//! ```

mod where_builder;


pub use where_builder::{WhereBuilder, WhereClause, escape_like};

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;

/// A set of optional listing constraints that compiles to WHERE predicates.
pub trait ListingFilter {
    /// Compile with placeholders starting after `offset`.
    fn compile_from(&self, offset: usize) -> JoblyResult<WhereClause>;

    /// Compile with placeholders starting at `$1`.
    fn compile(&self) -> JoblyResult<WhereClause> {
        self.compile_from(0)
    }
}

/// Company listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    /// Inclusive lower bound on `num_employees`.
    pub min_employees: Option<i32>,
    /// Inclusive upper bound on `num_employees`.
    pub max_employees: Option<i32>,
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
}

impl ListingFilter for CompanyFilter {
    fn compile_from(&self, offset: usize) -> JoblyResult<WhereClause> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::bad_request(format!(
                    "minEmployees ({min}) cannot be greater than maxEmployees ({max})"
                )));
            }
        }

        let mut builder = WhereBuilder::with_offset(offset);
        builder
            .and_gte_opt("num_employees", self.min_employees)
            .and_lte_opt("num_employees", self.max_employees)
            .and_contains_opt("name", self.name.as_deref());
        Ok(builder.build())
    }
}

/// Job listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    /// Case-insensitive substring of the job title.
    pub title: Option<String>,
    /// Inclusive lower bound on `salary`.
    pub min_salary: Option<i32>,
    /// `true` keeps only postings with equity above zero; `false` is no constraint.
    pub has_equity: Option<bool>,
}

impl ListingFilter for JobFilter {
    fn compile_from(&self, offset: usize) -> JoblyResult<WhereClause> {
        let mut builder = WhereBuilder::with_offset(offset);
        builder
            .and_contains_opt("title", self.title.as_deref())
            .and_gte_opt("salary", self.min_salary);
        if self.has_equity == Some(true) {
            builder.and_raw("equity > 0");
        }
        Ok(builder.build())
    }
}
