// src/db/subscription_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::subscription::{Subscription, UpsertSubscription},
};

/// Um registro de assinatura por academia.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, tenant_id: Uuid) -> Result<Option<Subscription>, AppError>;

    /// Sobrescreve plano, status e vencimento. Repetir os mesmos valores não altera o registro.
    async fn upsert(&self, input: &UpsertSubscription) -> Result<Subscription, AppError>;

    /// Cria o registro apenas se ainda não existir; devolve o registro vigente.
    async fn insert_if_absent(&self, input: &UpsertSubscription) -> Result<Subscription, AppError>;
}

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn get(&self, tenant_id: Uuid) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn upsert(&self, input: &UpsertSubscription) -> Result<Subscription, AppError> {
        // O WHERE impede que uma reentrega idêntica mexa em updated_at
        let updated = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (tenant_id, plan, status, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id)
            DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
            WHERE (subscriptions.plan, subscriptions.status, subscriptions.expires_at)
                IS DISTINCT FROM (EXCLUDED.plan, EXCLUDED.status, EXCLUDED.expires_at)
            RETURNING *
            "#,
        )
        .bind(input.tenant_id)
        .bind(input.plan)
        .bind(input.status)
        .bind(input.expires_at)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(subscription) => Ok(subscription),
            None => self
                .get(input.tenant_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Assinatura sumiu durante o upsert").into()),
        }
    }

    async fn insert_if_absent(&self, input: &UpsertSubscription) -> Result<Subscription, AppError> {
        let inserted = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (tenant_id, plan, status, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(input.tenant_id)
        .bind(input.plan)
        .bind(input.status)
        .bind(input.expires_at)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(subscription) => Ok(subscription),
            None => self
                .get(input.tenant_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Assinatura sumiu durante a inicialização").into()),
        }
    }
}
