use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use labwatch_core::{ComputerId, LogId, MaintenanceLog};
use sqlx::{Row, SqlitePool, migrate::Migrator, sqlite::SqlitePoolOptions, sqlite::SqliteRow};
use ulid::Ulid;

use crate::registry::MaintenanceLogStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum SqliteLogError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

#[derive(Clone)]
pub struct SqliteLogStore {
    pool: SqlitePool,
}

impl SqliteLogStore {
    pub async fn new(path: impl AsRef<str>) -> Result<Self, SqliteLogError> {
        let connection_string = format!("sqlite:{}?mode=rwc", path.as_ref());
        let pool = SqlitePoolOptions::new().connect(&connection_string).await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self, SqliteLogError> {
        // A larger pool would hand each connection its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl MaintenanceLogStore for SqliteLogStore {
    type Error = SqliteLogError;

    async fn append(&self, entry: MaintenanceLog) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_logs (id, computer_id, date, description)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.0.to_string())
        .bind(entry.computer_id.0.to_string())
        .bind(entry.date.to_string())
        .bind(&*entry.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<MaintenanceLog>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, computer_id, date, description FROM maintenance_logs
            ORDER BY date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row_to_log).collect()
    }

    async fn counts_by_computer(&self) -> Result<HashMap<ComputerId, u64>, Self::Error> {
        let rows = sqlx::query(
            r#"SELECT computer_id, COUNT(*) AS entry_count FROM maintenance_logs GROUP BY computer_id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.try_get("computer_id")?;
            let ulid = Ulid::from_str(&id_str).map_err(|_| SqliteLogError::InvalidUlid(id_str))?;
            let count: i64 = row.try_get("entry_count")?;
            counts.insert(ComputerId(ulid), count as u64);
        }

        Ok(counts)
    }

    async fn has_entry_matching(
        &self,
        computer_id: ComputerId,
        date: jiff::civil::Date,
        needle: &str,
    ) -> Result<bool, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT id FROM maintenance_logs
            WHERE computer_id = ? AND date = ? AND description LIKE ?
            LIMIT 1
            "#,
        )
        .bind(computer_id.0.to_string())
        .bind(date.to_string())
        .bind(format!("%{}%", needle))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}

fn map_row_to_log(r: SqliteRow) -> Result<MaintenanceLog, SqliteLogError> {
    let id_str: String = r.try_get("id")?;
    let ulid = Ulid::from_str(&id_str).map_err(|_| SqliteLogError::InvalidUlid(id_str))?;

    let computer_id_str: String = r.try_get("computer_id")?;
    let computer_ulid = Ulid::from_str(&computer_id_str)
        .map_err(|_| SqliteLogError::InvalidUlid(computer_id_str))?;

    let date_str: String = r.try_get("date")?;
    let date = jiff::civil::Date::from_str(&date_str)
        .map_err(|_| SqliteLogError::InvalidDate(date_str))?;

    Ok(MaintenanceLog {
        id: LogId(ulid),
        computer_id: ComputerId(computer_ulid),
        date,
        description: r.try_get::<String, _>("description")?.into_boxed_str(),
    })
}
