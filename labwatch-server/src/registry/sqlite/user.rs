use std::str::FromStr;

use async_trait::async_trait;
use labwatch_core::{User, UserId};
use sqlx::{Row, SqlitePool, migrate::Migrator, sqlite::SqlitePoolOptions, sqlite::SqliteRow};
use ulid::Ulid;

use crate::registry::UserStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum SqliteUserError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
    #[error("username already taken: {0}")]
    UsernameTaken(Box<str>),
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub async fn new(path: impl AsRef<str>) -> Result<Self, SqliteUserError> {
        let connection_string = format!("sqlite:{}?mode=rwc", path.as_ref());
        let pool = SqlitePoolOptions::new().connect(&connection_string).await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self, SqliteUserError> {
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
impl UserStore for SqliteUserStore {
    type Error = SqliteUserError;

    async fn add(&self, user: User) -> Result<(), Self::Error> {
        let result = sqlx::query(
            r#"INSERT INTO users (id, username, salt, password_hash) VALUES (?, ?, ?, ?)"#,
        )
        .bind(user.id.0.to_string())
        .bind(&*user.username)
        .bind(&*user.salt)
        .bind(&*user.password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(SqliteUserError::UsernameTaken(user.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn users(&self) -> Result<Vec<User>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, salt, password_hash FROM users
            ORDER BY username ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row_to_user).collect()
    }

    async fn remove(&self, id: UserId) -> Result<bool, Self::Error> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = ?"#)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Self::Error> {
        let row = sqlx::query(
            r#"SELECT id, username, salt, password_hash FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row_to_user).transpose()
    }
}

fn map_row_to_user(r: SqliteRow) -> Result<User, SqliteUserError> {
    let id_str: String = r.try_get("id")?;
    let ulid = Ulid::from_str(&id_str).map_err(|_| SqliteUserError::InvalidUlid(id_str))?;

    Ok(User {
        id: UserId(ulid),
        username: r.try_get::<String, _>("username")?.into_boxed_str(),
        salt: r.try_get::<String, _>("salt")?.into_boxed_str(),
        password_hash: r.try_get::<String, _>("password_hash")?.into_boxed_str(),
    })
}

#[cfg(test)]
mod tests {
    use ulid::Ulid;

    use labwatch_core::{User, UserId};

    use crate::registry::UserStore;

    use super::{SqliteUserError, SqliteUserStore};

    fn mock_user(username: &str) -> User {
        User {
            id: UserId(Ulid::new()),
            username: username.into(),
            salt: "00112233445566778899aabbccddeeff".into(),
            password_hash: "deadbeef".into(),
        }
    }

    #[tokio::test]
    async fn test_add_and_find_user() {
        let store = SqliteUserStore::new_in_memory().await.unwrap();
        store.add(mock_user("admin")).await.unwrap();

        let found = store
            .find_by_username("admin")
            .await
            .unwrap()
            .expect("User should exist");
        assert_eq!(found.username, "admin".into());

        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = SqliteUserStore::new_in_memory().await.unwrap();
        store.add(mock_user("admin")).await.unwrap();

        let err = store.add(mock_user("admin")).await.unwrap_err();
        assert!(matches!(err, SqliteUserError::UsernameTaken(_)));
    }

    #[tokio::test]
    async fn test_remove_user() {
        let store = SqliteUserStore::new_in_memory().await.unwrap();
        let user = mock_user("admin");
        let id = user.id;
        store.add(user).await.unwrap();

        assert!(store.remove(id).await.unwrap());
        assert!(!store.remove(id).await.unwrap());
        assert!(store.find_by_username("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_ordered_by_username() {
        let store = SqliteUserStore::new_in_memory().await.unwrap();
        store.add(mock_user("zoe")).await.unwrap();
        store.add(mock_user("ana")).await.unwrap();

        let usernames: Vec<_> = store
            .users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(usernames, ["ana".into(), "zoe".into()]);
    }
}
