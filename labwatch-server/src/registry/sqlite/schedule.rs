use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use labwatch_core::{ComputerId, ScheduleEntry, ScheduleId};
use sqlx::{Row, SqlitePool, migrate::Migrator, sqlite::SqlitePoolOptions, sqlite::SqliteRow};
use ulid::Ulid;

use crate::registry::ScheduleStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum SqliteScheduleError {
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
pub struct SqliteScheduleStore {
    pool: SqlitePool,
}

impl SqliteScheduleStore {
    pub async fn new(path: impl AsRef<str>) -> Result<Self, SqliteScheduleError> {
        let connection_string = format!("sqlite:{}?mode=rwc", path.as_ref());
        let pool = SqlitePoolOptions::new().connect(&connection_string).await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self, SqliteScheduleError> {
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
impl ScheduleStore for SqliteScheduleStore {
    type Error = SqliteScheduleError;

    async fn add(&self, entry: ScheduleEntry) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_schedule (id, computer_id, scheduled_date, task)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.0.to_string())
        .bind(entry.computer_id.0.to_string())
        .bind(entry.scheduled_date.to_string())
        .bind(&*entry.task)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<ScheduleEntry>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, computer_id, scheduled_date, task FROM maintenance_schedule
            ORDER BY scheduled_date ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row_to_entry).collect()
    }

    async fn scheduled_computers(
        &self,
        date: jiff::civil::Date,
    ) -> Result<HashSet<ComputerId>, Self::Error> {
        let rows = sqlx::query(
            r#"SELECT DISTINCT computer_id FROM maintenance_schedule WHERE scheduled_date = ?"#,
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut scheduled = HashSet::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.try_get("computer_id")?;
            let ulid =
                Ulid::from_str(&id_str).map_err(|_| SqliteScheduleError::InvalidUlid(id_str))?;
            scheduled.insert(ComputerId(ulid));
        }

        Ok(scheduled)
    }

    async fn next_by_computer(
        &self,
    ) -> Result<HashMap<ComputerId, jiff::civil::Date>, Self::Error> {
        // ISO dates in TEXT columns order lexically, so MIN is the earliest.
        let rows = sqlx::query(
            r#"
            SELECT computer_id, MIN(scheduled_date) AS next_date FROM maintenance_schedule
            GROUP BY computer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut next = HashMap::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.try_get("computer_id")?;
            let ulid =
                Ulid::from_str(&id_str).map_err(|_| SqliteScheduleError::InvalidUlid(id_str))?;
            let date_str: String = row.try_get("next_date")?;
            let date = jiff::civil::Date::from_str(&date_str)
                .map_err(|_| SqliteScheduleError::InvalidDate(date_str))?;
            next.insert(ComputerId(ulid), date);
        }

        Ok(next)
    }
}

fn map_row_to_entry(r: SqliteRow) -> Result<ScheduleEntry, SqliteScheduleError> {
    let id_str: String = r.try_get("id")?;
    let ulid = Ulid::from_str(&id_str).map_err(|_| SqliteScheduleError::InvalidUlid(id_str))?;

    let computer_id_str: String = r.try_get("computer_id")?;
    let computer_ulid = Ulid::from_str(&computer_id_str)
        .map_err(|_| SqliteScheduleError::InvalidUlid(computer_id_str))?;

    let date_str: String = r.try_get("scheduled_date")?;
    let scheduled_date = jiff::civil::Date::from_str(&date_str)
        .map_err(|_| SqliteScheduleError::InvalidDate(date_str))?;

    Ok(ScheduleEntry {
        id: ScheduleId(ulid),
        computer_id: ComputerId(computer_ulid),
        scheduled_date,
        task: r.try_get::<String, _>("task")?.into_boxed_str(),
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use ulid::Ulid;

    use labwatch_core::{ComputerId, ScheduleEntry, ScheduleId};

    use crate::registry::ScheduleStore;

    use super::SqliteScheduleStore;

    fn mock_entry(computer_id: ComputerId, day: jiff::civil::Date) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleId(Ulid::new()),
            computer_id,
            scheduled_date: day,
            task: "Dust out the case".into(),
        }
    }

    #[tokio::test]
    async fn test_entries_ordered_by_date() {
        let store = SqliteScheduleStore::new_in_memory().await.unwrap();
        let a = ComputerId(Ulid::new());

        store.add(mock_entry(a, date(2024, 6, 1))).await.unwrap();
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries[0].scheduled_date, date(2024, 3, 15));
        assert_eq!(entries[1].scheduled_date, date(2024, 6, 1));
    }

    #[tokio::test]
    async fn test_scheduled_computers_matches_exact_date() {
        let store = SqliteScheduleStore::new_in_memory().await.unwrap();
        let a = ComputerId(Ulid::new());
        let b = ComputerId(Ulid::new());

        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();
        store.add(mock_entry(b, date(2024, 3, 16))).await.unwrap();

        let scheduled = store.scheduled_computers(date(2024, 3, 15)).await.unwrap();
        assert_eq!(scheduled.len(), 1);
        assert!(scheduled.contains(&a));
    }

    #[tokio::test]
    async fn test_next_by_computer_takes_minimum() {
        let store = SqliteScheduleStore::new_in_memory().await.unwrap();
        let a = ComputerId(Ulid::new());
        let b = ComputerId(Ulid::new());

        store.add(mock_entry(a, date(2024, 9, 30))).await.unwrap();
        store.add(mock_entry(a, date(2024, 3, 15))).await.unwrap();
        store.add(mock_entry(b, date(2025, 1, 2))).await.unwrap();

        let next = store.next_by_computer().await.unwrap();
        assert_eq!(next.get(&a), Some(&date(2024, 3, 15)));
        assert_eq!(next.get(&b), Some(&date(2025, 1, 2)));
    }
}
