use super::job::{JOB_COLUMNS, Job};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{CompanyFilter, ListingFilter, WhereClause};
use crate::log::{log_rejected, log_sql};
use crate::row::{FromRow, RowExt, map_rows};
use crate::set_clause::{ColumnAliases, FieldMap, SetClause, compile_set_clause};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

pub(crate) const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Fields a company update may touch. `handle` is the key and never changes.
pub const COMPANY_UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A company together with its job postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

fn company_aliases() -> ColumnAliases {
    ColumnAliases::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
}

/// `SELECT` for the company listing, plus the filter values to bind.
pub(crate) fn find_all_sql(filter: &CompanyFilter) -> JoblyResult<(String, WhereClause)> {
    let clause = filter.compile()?;
    let mut sql = format!("SELECT {COMPANY_COLUMNS} FROM companies");
    clause.push_to(&mut sql);
    sql.push_str(" ORDER BY name");
    Ok((sql, clause))
}

/// `UPDATE` for a partial company update. The handle binds at the last placeholder.
pub(crate) fn update_sql(fields: &FieldMap) -> JoblyResult<(String, SetClause)> {
    fields.ensure_only(COMPANY_UPDATABLE)?;
    let set = compile_set_clause(fields, &company_aliases())?;
    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLUMNS}",
        set.set_cols,
        set.next_placeholder()
    );
    Ok((sql, set))
}

impl Company {
    /// Create a company.
    ///
    /// Fails with a bad request if the handle is already taken.
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        const TAG: &str = "company.create";

        let dup_sql = "SELECT handle FROM companies WHERE handle = $1";
        log_sql(TAG, dup_sql, 1);
        if conn.query_opt(dup_sql, &[&new.handle]).await?.is_some() {
            let err = JoblyError::bad_request(format!("Duplicate company: {}", new.handle));
            log_rejected(TAG, &err);
            return Err(err);
        }

        let sql = format!(
            "INSERT INTO companies ({COMPANY_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_COLUMNS}"
        );
        log_sql(TAG, &sql, 5);
        let row = conn
            .query_one(
                &sql,
                &[
                    &new.handle,
                    &new.name,
                    &new.description,
                    &new.num_employees,
                    &new.logo_url,
                ],
            )
            .await?;
        Company::from_row(&row)
    }

    /// List companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        const TAG: &str = "company.find_all";

        let (sql, clause) = find_all_sql(filter).inspect_err(|e| log_rejected(TAG, e))?;
        log_sql(TAG, &sql, clause.values.len());
        let rows = conn.query(&sql, &clause.params_ref()).await?;
        map_rows(&rows)
    }

    /// Fetch a company and its jobs (ordered by id).
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        const TAG: &str = "company.get";

        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
        log_sql(TAG, &sql, 1);
        let row = conn
            .query_opt(&sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        let company = Company::from_row(&row)?;

        let jobs_sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id");
        log_sql(TAG, &jobs_sql, 1);
        let rows = conn.query(&jobs_sql, &[&handle]).await?;
        let jobs = map_rows(&rows)?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Partially update a company.
    ///
    /// `fields` uses API names (`numEmployees`, `logoUrl`); only
    /// [`COMPANY_UPDATABLE`] fields are accepted.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        fields: &FieldMap,
    ) -> JoblyResult<Company> {
        const TAG: &str = "company.update";

        let (sql, set) = update_sql(fields).inspect_err(|e| log_rejected(TAG, e))?;
        let mut params = set.params_ref();
        params.push(&handle as &(dyn ToSql + Sync));

        log_sql(TAG, &sql, params.len());
        let row = conn
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// Delete a company (its jobs go with it).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        const TAG: &str = "company.remove";

        let sql = "DELETE FROM companies WHERE handle = $1";
        log_sql(TAG, sql, 1);
        match conn.execute(sql, &[&handle]).await? {
            0 => Err(JoblyError::not_found(format!("No company: {handle}"))),
            _ => Ok(()),
        }
    }
}
