// src/db/access_log_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::access::{AccessLogEntry, NewAccessLogEntry},
};

/// Log de acessos, somente inclusão. ID e horário são definidos pelo repositório.
#[async_trait]
pub trait AccessLogSink: Send + Sync {
    async fn append(&self, entry: NewAccessLogEntry) -> Result<AccessLogEntry, AppError>;

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<AccessLogEntry>, AppError>;
}

#[derive(Clone)]
pub struct AccessLogRepository {
    pool: PgPool,
}

impl AccessLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogSink for AccessLogRepository {
    async fn append(&self, entry: NewAccessLogEntry) -> Result<AccessLogEntry, AppError> {
        let saved = sqlx::query_as::<_, AccessLogEntry>(
            r#"
            INSERT INTO access_logs (
                tenant_id, actor_name, actor_email, actor_kind, outcome,
                block_reason, method, collector, liberator
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(entry.tenant_id)
        .bind(entry.actor_name)
        .bind(entry.actor_email)
        .bind(entry.actor_kind)
        .bind(entry.outcome)
        .bind(entry.block_reason)
        .bind(entry.method)
        .bind(entry.collector)
        .bind(entry.liberator)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<AccessLogEntry>, AppError> {
        let entries = sqlx::query_as::<_, AccessLogEntry>(
            "SELECT * FROM access_logs WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
