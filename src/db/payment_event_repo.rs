// src/db/payment_event_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

/// Eventos do provedor de pagamento já aplicados (deduplicação de webhooks).
#[async_trait]
pub trait PaymentEventLedger: Send + Sync {
    async fn contains(&self, event_id: &str) -> Result<bool, AppError>;

    /// Gravado só depois que o evento foi aplicado.
    /// `true` quando o evento ainda não tinha sido registrado.
    async fn record(&self, tenant_id: Uuid, event_id: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PaymentEventRepository {
    pool: PgPool,
}

impl PaymentEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentEventLedger for PaymentEventRepository {
    async fn contains(&self, event_id: &str) -> Result<bool, AppError> {
        let seen = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM processed_payment_events WHERE event_id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(seen)
    }

    async fn record(&self, tenant_id: Uuid, event_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_payment_events (event_id, tenant_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
