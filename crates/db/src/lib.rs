use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};

use wizard::StoreError;

pub mod models;
mod moderation;
mod record_store;
mod service;
mod service_type;
mod user;

#[cfg(test)]
mod tests;

const USER_TABLE: &str = "user";
const SERVICE_TYPE_TABLE: &str = "service_type";
const FIELD_TABLE: &str = "service_type_field";
const SERVICE_TABLE: &str = "service";
const COMPLAINT_TABLE: &str = "complaint";
const BAN_TABLE: &str = "ban";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run query: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to (de)serialize json column: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value in column {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for StoreError {
    fn from(e: Error) -> Self {
        match e {
            Error::Sqlx(sqlx::Error::RowNotFound) => Self::NotFound,
            Error::Sqlx(e)
                if e.as_database_error()
                    .is_some_and(|e| e.is_unique_violation()) =>
            {
                Self::Conflict
            }
            e => Self::Backend(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DB {
    pool: SqlitePool,
}

impl DB {
    pub async fn init(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

// Stats
impl DB {
    pub async fn load_stats(&self) -> Result<models::Stats> {
        Ok(models::Stats {
            users: self.load_count(&format!("from {USER_TABLE}")).await?,
            sellers: self
                .load_count(&format!("from {USER_TABLE} u where u.is_seller = true"))
                .await?,
            service_types: self
                .load_count(&format!("from {SERVICE_TYPE_TABLE} t where t.is_active = true"))
                .await?,
            services: self
                .load_count(&format!("from {SERVICE_TABLE} s where s.status = 'active'"))
                .await?,
            complaints: self.load_count(&format!("from {COMPLAINT_TABLE}")).await?,
        })
    }
    async fn load_count(&self, sql_predicate: &str) -> Result<u32> {
        Ok(
            sqlx::query_as::<_, models::fetch::Count>(&format!("select count(*) as count {sql_predicate}"))
                .fetch_one(&self.pool)
                .await?
                .count,
        )
    }
}

trait IgnoreNotFound<T> {
    type Error;

    fn ignore_not_found(self) -> Result<Option<T>, Self::Error>;
}

impl<T> IgnoreNotFound<T> for std::result::Result<T, sqlx::Error> {
    type Error = sqlx::Error;

    fn ignore_not_found(self) -> std::result::Result<Option<T>, Self::Error> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
