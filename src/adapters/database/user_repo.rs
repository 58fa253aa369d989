use crate::adapters::database::records::UserRecord;
use crate::adapters::database::{DbPool, UNIQUE_VIOLATION, is_violation};
use crate::domain::store::UserStore;
use crate::domain::user::{NewUser, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(level = "debug", skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: NewUser) -> Result<User> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, phone, join_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING username, password_hash, first_name, last_name, phone, join_at, last_login_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(e) if is_violation(&e, UNIQUE_VIOLATION) => Err(AppError::Conflict("Username already taken".into())),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT username, password_hash, first_name, last_name, phone, join_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn touch_last_login(&self, username: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
