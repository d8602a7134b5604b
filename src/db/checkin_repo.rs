// src/db/checkin_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::checkin::{NewPartnerCheckin, PartnerCheckin},
};

#[async_trait]
pub trait CheckinSink: Send + Sync {
    async fn append(&self, checkin: NewPartnerCheckin) -> Result<PartnerCheckin, AppError>;

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<PartnerCheckin>, AppError>;
}

#[derive(Clone)]
pub struct CheckinRepository {
    pool: PgPool,
}

impl CheckinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckinSink for CheckinRepository {
    async fn append(&self, checkin: NewPartnerCheckin) -> Result<PartnerCheckin, AppError> {
        let saved = sqlx::query_as::<_, PartnerCheckin>(
            r#"
            INSERT INTO partner_checkins (tenant_id, partner_user_id, user_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(checkin.tenant_id)
        .bind(checkin.partner_user_id)
        .bind(checkin.user_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<PartnerCheckin>, AppError> {
        let checkins = sqlx::query_as::<_, PartnerCheckin>(
            "SELECT * FROM partner_checkins WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(checkins)
    }
}
