// src/services/subscription_service.rs

use std::sync::Arc;

use chrono::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    common::{clock::Clock, deadline::within, error::AppError},
    db::{PaymentEventLedger, SubscriptionStore},
    models::subscription::{
        days_remaining, PaymentConfirmedPayload, SimulateSubscriptionPayload, Subscription,
        SubscriptionOverview, SubscriptionPlan, SubscriptionStatus, SubscriptionUiStatus,
        UpsertSubscription,
    },
};

/// Portão da plataforma: sem registro ou com status `blocked`, a academia inteira
/// fica fechada. Compartilhado pela catraca e pelo check-in de parceiros.
pub(crate) async fn is_platform_blocked(
    store: &dyn SubscriptionStore,
    tenant_id: Uuid,
    deadline: Instant,
) -> Result<bool, AppError> {
    let subscription = within(deadline, store.get(tenant_id)).await?;
    Ok(subscription.is_none_or(|s| s.is_blocked()))
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    ledger: Arc<dyn PaymentEventLedger>,
    clock: Arc<dyn Clock>,
    trial_days: i64,
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        ledger: Arc<dyn PaymentEventLedger>,
        clock: Arc<dyn Clock>,
        trial_days: i64,
    ) -> Self {
        Self { store, ledger, clock, trial_days }
    }

    /// Situação atual da assinatura, com o status derivado recalculado agora.
    pub async fn overview(
        &self,
        tenant_id: Uuid,
        deadline: Instant,
    ) -> Result<SubscriptionOverview, AppError> {
        let now = self.clock.now();
        let subscription = within(deadline, self.store.get(tenant_id)).await?;
        let expires_at = subscription.as_ref().map(|s| s.expires_at);
        let ui_status = SubscriptionUiStatus::derive(now, expires_at);

        Ok(SubscriptionOverview {
            ui_status,
            days_remaining: expires_at.map(|e| days_remaining(now, e)),
            allows_sensitive_writes: ui_status.allows_sensitive_writes(),
            subscription,
        })
    }

    /// Primeiro login: cria a assinatura de avaliação se ainda não existir.
    pub async fn ensure_initialized(
        &self,
        tenant_id: Uuid,
        deadline: Instant,
    ) -> Result<Subscription, AppError> {
        let trial = UpsertSubscription {
            tenant_id,
            plan: SubscriptionPlan::Basic,
            status: SubscriptionStatus::Active,
            expires_at: self.clock.now() + Duration::days(self.trial_days),
        };
        let subscription = within(deadline, self.store.insert_if_absent(&trial)).await?;
        tracing::info!("Assinatura da academia {} inicializada/verificada.", tenant_id);
        Ok(subscription)
    }

    /// Contrato da ponte de pagamentos: pagamento confirmado reativa a academia.
    ///
    /// O ID do evento só é marcado como processado depois que o upsert deu certo;
    /// uma falha no meio deixa a reentrega livre para tentar de novo.
    pub async fn on_payment_confirmed(
        &self,
        tenant_id: Uuid,
        payment: &PaymentConfirmedPayload,
        deadline: Instant,
    ) -> Result<Subscription, AppError> {
        let event_id = payment.event_id.as_deref();

        if let Some(event_id) = event_id {
            if within(deadline, self.ledger.contains(event_id)).await? {
                tracing::info!("Evento de pagamento {} já processado, ignorando.", event_id);
                if let Some(current) = within(deadline, self.store.get(tenant_id)).await? {
                    return Ok(current);
                }
            }
        }

        let subscription = within(
            deadline,
            self.store.upsert(&UpsertSubscription {
                tenant_id,
                plan: payment.plan,
                status: SubscriptionStatus::Active,
                expires_at: payment.expires_at,
            }),
        )
        .await?;

        if let Some(event_id) = event_id {
            // O pagamento já foi aplicado; reaplicar numa reentrega é inofensivo
            if let Err(e) = within(deadline, self.ledger.record(tenant_id, event_id)).await {
                tracing::warn!("Falha ao registrar o evento de pagamento {}: {}", event_id, e);
            }
        }

        tracing::info!(
            "💳 Pagamento confirmado para a academia {}: plano {:?} até {}",
            tenant_id,
            subscription.plan,
            subscription.expires_at
        );
        Ok(subscription)
    }

    /// Ação manual de simulação: força status e vencimento.
    pub async fn simulate(
        &self,
        tenant_id: Uuid,
        input: &SimulateSubscriptionPayload,
        deadline: Instant,
    ) -> Result<Subscription, AppError> {
        let plan = match input.plan {
            Some(plan) => plan,
            None => within(deadline, self.store.get(tenant_id))
                .await?
                .map(|s| s.plan)
                .unwrap_or(SubscriptionPlan::Basic),
        };

        let subscription = within(
            deadline,
            self.store.upsert(&UpsertSubscription {
                tenant_id,
                plan,
                status: input.status,
                expires_at: input.expires_at,
            }),
        )
        .await?;

        tracing::warn!(
            "Assinatura da academia {} alterada manualmente para {:?}",
            tenant_id,
            subscription.status
        );
        Ok(subscription)
    }
}
