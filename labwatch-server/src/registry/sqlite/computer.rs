use std::str::FromStr;

use async_trait::async_trait;
use labwatch_core::{Computer, ComputerId, ComputerStatus, ComputerUpdate, MacAddr};
use sqlx::{Row, SqlitePool, migrate::Migrator, sqlite::SqlitePoolOptions, sqlite::SqliteRow};
use ulid::Ulid;

use crate::registry::ComputerRegistry;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum SqliteComputerError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

#[derive(Clone)]
pub struct SqliteComputerRegistry {
    pool: SqlitePool,
}

impl SqliteComputerRegistry {
    pub async fn new(path: impl AsRef<str>) -> Result<Self, SqliteComputerError> {
        let connection_string = format!("sqlite:{}?mode=rwc", path.as_ref());
        let pool = SqlitePoolOptions::new().connect(&connection_string).await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self, SqliteComputerError> {
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
impl ComputerRegistry for SqliteComputerRegistry {
    type Error = SqliteComputerError;

    async fn register(&self, computer: Computer) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO computers (id, name, addr, mac, location, status, enrolled_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(computer.id.0.to_string())
        .bind(&*computer.name)
        .bind(&*computer.addr)
        .bind(computer.mac.to_string())
        .bind(&*computer.location)
        .bind(computer.status.as_str())
        .bind(computer.enrolled_at.as_second())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn computer(&self, id: ComputerId) -> Result<Option<Computer>, Self::Error> {
        let row = sqlx::query(
            r#"SELECT id, name, addr, mac, location, status, enrolled_at FROM computers WHERE id = ?"#,
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row_to_computer).transpose()
    }

    async fn computers(&self) -> Result<Vec<Computer>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, addr, mac, location, status, enrolled_at FROM computers
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row_to_computer).collect()
    }

    async fn update(
        &self,
        id: ComputerId,
        update: ComputerUpdate,
    ) -> Result<Option<Computer>, Self::Error> {
        let result = sqlx::query(
            r#"
            UPDATE computers SET name = ?, addr = ?, mac = ?, location = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&*update.name)
        .bind(&*update.addr)
        .bind(update.mac.to_string())
        .bind(&*update.location)
        .bind(update.status.as_str())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.computer(id).await
    }

    async fn remove(&self, id: ComputerId) -> Result<bool, Self::Error> {
        let result = sqlx::query(r#"DELETE FROM computers WHERE id = ?"#)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(
        &self,
        id: ComputerId,
        status: ComputerStatus,
    ) -> Result<bool, Self::Error> {
        let result = sqlx::query(r#"UPDATE computers SET status = ? WHERE id = ?"#)
            .bind(status.as_str())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_computer(r: SqliteRow) -> Result<Computer, SqliteComputerError> {
    let id_str: String = r.try_get("id")?;
    let ulid = Ulid::from_str(&id_str).map_err(|_| SqliteComputerError::InvalidUlid(id_str))?;

    let status_str: String = r.try_get("status")?;
    let status = ComputerStatus::from_str(&status_str)
        .map_err(|_| SqliteComputerError::InvalidStatus(status_str))?;

    let mac_str: String = r.try_get("mac")?;
    let mac = MacAddr::from_str(&mac_str).map_err(|_| SqliteComputerError::InvalidMac(mac_str))?;

    let enrolled_at: i64 = r.try_get("enrolled_at")?;
    let enrolled_at = jiff::Timestamp::from_second(enrolled_at)
        .map_err(|_| SqliteComputerError::InvalidTimestamp(enrolled_at))?;

    Ok(Computer {
        id: ComputerId(ulid),
        name: r.try_get::<String, _>("name")?.into_boxed_str(),
        addr: r.try_get::<String, _>("addr")?.into_boxed_str(),
        mac,
        location: r.try_get::<String, _>("location")?.into_boxed_str(),
        status,
        enrolled_at,
    })
}
