use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{JobFilter, ListingFilter, WhereClause};
use crate::log::{log_rejected, log_sql};
use crate::row::{FromRow, RowExt, map_rows};
use crate::set_clause::{ColumnAliases, FieldMap, SetClause, compile_set_clause};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

pub(crate) const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Fields a job update may touch.
pub const JOB_UPDATABLE: &[&str] = &["title", "salary", "equity", "companyHandle"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered, `0 <= equity <= 1`.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

fn job_aliases() -> ColumnAliases {
    ColumnAliases::from([("companyHandle", "company_handle")])
}

pub(crate) fn find_all_sql(filter: &JobFilter) -> JoblyResult<(String, WhereClause)> {
    let clause = filter.compile()?;
    let mut sql = format!("SELECT {JOB_COLUMNS} FROM jobs");
    clause.push_to(&mut sql);
    sql.push_str(" ORDER BY title");
    Ok((sql, clause))
}

pub(crate) fn update_sql(fields: &FieldMap) -> JoblyResult<(String, SetClause)> {
    fields.ensure_only(JOB_UPDATABLE)?;
    let set = compile_set_clause(fields, &job_aliases())?;
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
        set.set_cols,
        set.next_placeholder()
    );
    Ok((sql, set))
}

impl Job {
    /// Create a job posting.
    ///
    /// A missing company surfaces as a foreign key violation from the database.
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        const TAG: &str = "job.create";

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        );
        log_sql(TAG, &sql, 4);
        let row = conn
            .query_one(
                &sql,
                &[&new.title, &new.salary, &new.equity, &new.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// List jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        const TAG: &str = "job.find_all";

        let (sql, clause) = find_all_sql(filter).inspect_err(|e| log_rejected(TAG, e))?;
        log_sql(TAG, &sql, clause.values.len());
        let rows = conn.query(&sql, &clause.params_ref()).await?;
        map_rows(&rows)
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        const TAG: &str = "job.get";

        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        log_sql(TAG, &sql, 1);
        let row = conn
            .query_opt(&sql, &[&id])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    /// Partially update a job.
    ///
    /// `fields` uses API names (`companyHandle`); only [`JOB_UPDATABLE`]
    /// fields are accepted.
    pub async fn update(conn: &impl GenericClient, id: i32, fields: &FieldMap) -> JoblyResult<Job> {
        const TAG: &str = "job.update";

        let (sql, set) = update_sql(fields).inspect_err(|e| log_rejected(TAG, e))?;
        let mut params = set.params_ref();
        params.push(&id as &(dyn ToSql + Sync));

        log_sql(TAG, &sql, params.len());
        let row = conn
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        const TAG: &str = "job.remove";

        let sql = "DELETE FROM jobs WHERE id = $1";
        log_sql(TAG, sql, 1);
        match conn.execute(sql, &[&id]).await? {
            0 => Err(JoblyError::not_found(format!("No job: {id}"))),
            _ => Ok(()),
        }
    }
}
