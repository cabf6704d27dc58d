//! Player credential store.
//!
//! Passwords are hashed with bcrypt: the salt comes from the OS CSPRNG and
//! verification compares in constant time. Both run on the blocking pool.
//! Password text is never logged.

use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Player already exists: {0}")]
    AlreadyExists(String),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
    cost: u32,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool, cost: u32) -> Self {
        Self { pool, cost }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM players WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// True only if `name` exists and `password` matches its stored hash.
    pub async fn verify(&self, name: &str, password: &str) -> Result<bool, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT hash FROM players WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        let Some((hash,)) = row else {
            return Ok(false);
        };

        let password = password.to_owned();
        let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        Ok(ok)
    }

    /// Store a new credential with a fresh random salt.
    pub async fn create(&self, name: &str, password: &str) -> Result<(), StoreError> {
        let password = password.to_owned();
        let cost = self.cost;
        let parts = tokio::task::spawn_blocking(move || bcrypt::hash_with_result(password, cost))
            .await??;

        let result = sqlx::query(
            "INSERT INTO players (name, salt, hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(parts.get_salt())
        .bind(parts.format_for_version(bcrypt::Version::TwoB))
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!("[db] [player_created] name={}", name);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::AlreadyExists(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Record a successful login.
    pub async fn touch_login(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE players SET last_login = ? WHERE name = ?")
            .bind(chrono::Utc::now().timestamp())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
