//! Organization membership repository

use crate::domain::Membership;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Look up a user's membership record in one organization
    async fn find_membership(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Membership>>;
}

pub struct MembershipRepositoryImpl {
    pool: MySqlPool,
}

impl MembershipRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for MembershipRepositoryImpl {
    async fn find_membership(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, organization_id, role, status, joined_at
            FROM organization_members
            WHERE user_id = ? AND organization_id = ?
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }
}
