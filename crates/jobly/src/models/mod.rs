//! Company and job models.
//!
//! Each operation issues parameterized SQL through the injected
//! [`GenericClient`](crate::GenericClient). Partial updates go through
//! [`compile_set_clause`](crate::compile_set_clause) and listings through the
//! [`ListingFilter`](crate::ListingFilter) compilers.

mod company;
mod job;

#[cfg(test)]
mod tests;

pub use company::{COMPANY_UPDATABLE, Company, CompanyDetail, NewCompany};
pub use job::{JOB_UPDATABLE, Job, NewJob};
