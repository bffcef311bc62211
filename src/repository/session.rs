//! Session repository
//!
//! The identity collaborator at this subsystem's boundary: an opaque bearer
//! token resolves to the authenticated user id and their global role, or to
//! nothing when the session is missing, revoked, or expired.

use crate::domain::{AuthenticatedUser, Role};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolve a bearer token to an authenticated identity
    async fn find_identity_by_token(&self, token: &str) -> Result<Option<AuthenticatedUser>>;
}

pub struct SessionRepositoryImpl {
    pool: MySqlPool,
}

impl SessionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn find_identity_by_token(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let row = sqlx::query_as::<_, (String, Option<String>)>(
            r#"
            SELECT s.user_id, u.global_role
            FROM api_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ? AND s.revoked_at IS NULL AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, global_role)| AuthenticatedUser {
            user_id,
            // An unrecognized stored role grants no global privilege.
            global_role: global_role.as_deref().and_then(Role::parse),
        }))
    }
}
