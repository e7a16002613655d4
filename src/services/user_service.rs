use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{Error, Result};
use crate::utils::time::{now, to_db_timestamp};

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Removes the user; practice records and daily plans follow through the
    /// schema's `ON DELETE CASCADE`.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} does not exist", id)));
        }
        tracing::info!(user_id = id, "deleted user and owned practice data");
        Ok(())
    }
}

/// Mirrors an identity from the auth provider the first time something is
/// written on its behalf.
pub async fn ensure_user(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    sqlx::query("INSERT INTO users (id, created_at) VALUES (?, ?) ON CONFLICT (id) DO NOTHING")
        .bind(id)
        .bind(to_db_timestamp(now()))
        .execute(conn)
        .await?;
    Ok(())
}
