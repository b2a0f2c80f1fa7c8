//! Connection pool utilities

use crate::config::DatabaseConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`DatabaseConfig`].
///
/// Uses `NoTls`, which suits the local Unix-socket default.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool(&DatabaseConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let companies = Company::find_all(&client, &CompanyFilter::default()).await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        let err = create_pool(&DatabaseConfig::new("not a url ::")).unwrap_err();
        assert!(matches!(err, JoblyError::Connection(_)));
    }
}
