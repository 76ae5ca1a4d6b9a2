use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

/// A row of the `users` table. `password` holds the PHC hash.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load user {}", id))?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("failed to look up user by email")?;
        Ok(user)
    }

    /// Insert a user whose password is already hashed.
    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password) VALUES (?, ?, ?) \
             RETURNING id, name, email, password",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to create user '{}'", email))?;

        tx.commit().await.context("failed to commit user insert")?;
        Ok(user)
    }
}

/// Denylist of logged-out token ids, kept until the tokens would have expired anyway.
#[derive(Clone)]
pub struct RevokedTokens {
    pool: SqlitePool,
}

impl RevokedTokens {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn contains(&self, jti: &str) -> anyhow::Result<bool> {
        let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM revoked_tokens WHERE jti = ?")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
            .context("failed to check token revocation")?;
        Ok(hit.is_some())
    }

    /// Revoke `jti` and drop entries whose tokens have expired.
    pub async fn revoke(&self, jti: &str, expires_at: i64) -> anyhow::Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("failed to purge expired revocations")?;
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)")
            .bind(jti)
            .bind(expires_at)
            .execute(&mut *tx)
            .await
            .context("failed to revoke token")?;

        tx.commit().await.context("failed to commit token revocation")?;
        Ok(())
    }
}
