//! # jobly
//!
//! Companies and job postings over PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`compile_set_clause`] turns a sparse [`FieldMap`] into
//!   `"col"=$1, "other"=$2` plus a value list in the same order
//! - **Listing filters**: [`CompanyFilter`] / [`JobFilter`] compile to `AND`-joined
//!   predicates with aligned placeholders
//! - **Values are always bound**: only quoted column identifiers are written into SQL text
//! - **Transaction-friendly**: models take any [`GenericClient`]
//! - **Distinguishable input errors**: [`JoblyError::is_bad_request`]
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Company, CompanyFilter, FieldMap};
//!
//! let companies = Company::find_all(&client, &CompanyFilter {
//!     min_employees: Some(10),
//!     ..Default::default()
//! }).await?;
//!
//! let patch = FieldMap::new().with("numEmployees", 12);
//! let company = Company::update(&client, "anderson-arias-morrow", &patch).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod models;
pub mod row;
pub mod set_clause;
pub mod value;

mod log;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use error::{JoblyError, JoblyResult};
pub use filter::{CompanyFilter, JobFilter, ListingFilter, WhereBuilder, WhereClause};
pub use models::{Company, CompanyDetail, Job, NewCompany, NewJob};
pub use row::{FromRow, RowExt};
pub use set_clause::{ColumnAliases, FieldMap, SetClause, compile_set_clause};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;
