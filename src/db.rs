use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Creates or upgrades every table the stores read from.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Error returned by every repository trait.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(subject_of(db_err.constraint()));
            }
        }
        StoreError::Other(err.into())
    }
}

fn subject_of(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.contains("username") => "username",
        Some(c) if c.contains("email") => "email",
        Some(c) if c.starts_with("likes") => "like",
        Some(c) if c.starts_with("friendships") => "friendship",
        _ => "record",
    }
}
