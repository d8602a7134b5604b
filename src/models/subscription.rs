// src/models/subscription.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Limiares (em dias inteiros restantes) da classificação de saúde da assinatura.
const BLOCKED_AT_OR_BELOW: i64 = -5;
const OVERDUE_BELOW: i64 = -2;
const WARNING_AT_OR_BELOW: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_plan", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Basic,
    Pro,
    Premium,
}

/// Status gravado (grosso). Não confundir com [`SubscriptionUiStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Overdue,
    Blocked,
}

// ---
// Assinatura da academia (uma por tenant)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_blocked(&self) -> bool {
        self.status == SubscriptionStatus::Blocked
    }
}

/// Dados gravados por um upsert de assinatura.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertSubscription {
    pub tenant_id: Uuid,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
}

impl UpsertSubscription {
    /// Um upsert que não altera nada não deve tocar o registro.
    pub fn matches(&self, current: &Subscription) -> bool {
        self.plan == current.plan
            && self.status == current.status
            && self.expires_at == current.expires_at
    }
}

// ---
// Status derivado (nunca persistido)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionUiStatus {
    Active,
    Warning,
    Overdue,
    Blocked,
}

/// Dias inteiros entre `now` e `expires_at`, truncados em direção a zero.
/// Negativo quando o vencimento já passou.
pub fn days_remaining(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> i64 {
    (expires_at - now).num_days()
}

impl SubscriptionUiStatus {
    /// Classifica a assinatura. Sem registro, falha fechado (`Blocked`).
    pub fn derive(now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        match expires_at {
            None => SubscriptionUiStatus::Blocked,
            Some(expires_at) => Self::from_days_remaining(days_remaining(now, expires_at)),
        }
    }

    pub fn from_days_remaining(days: i64) -> Self {
        if days <= BLOCKED_AT_OR_BELOW {
            SubscriptionUiStatus::Blocked
        } else if days < OVERDUE_BELOW {
            SubscriptionUiStatus::Overdue
        } else if days <= WARNING_AT_OR_BELOW {
            SubscriptionUiStatus::Warning
        } else {
            SubscriptionUiStatus::Active
        }
    }

    /// Emissão de notas e novas vendas exigem uma assinatura saudável.
    pub fn allows_sensitive_writes(&self) -> bool {
        matches!(self, SubscriptionUiStatus::Active | SubscriptionUiStatus::Warning)
    }
}

// ---
// Respostas e payloads
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOverview {
    pub subscription: Option<Subscription>,
    pub ui_status: SubscriptionUiStatus,
    pub days_remaining: Option<i64>,
    pub allows_sensitive_writes: bool,
}

/// Contrato da ponte de pagamentos (checkout confirmado).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmedPayload {
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,

    // ID do evento no provedor de pagamentos (deduplicação de reentregas)
    #[schema(example = "evt_1PqXyZ")]
    pub event_id: Option<String>,
}

/// Ação manual de simulação/teste.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulateSubscriptionPayload {
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub plan: Option<SubscriptionPlan>,
}
