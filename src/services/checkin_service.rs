// src/services/checkin_service.rs

use std::sync::Arc;

use tokio::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{deadline::within, error::AppError},
    db::{CheckinSink, SubscriptionStore},
    models::{
        access::DenialReason,
        checkin::{CheckinVerdict, NewPartnerCheckin, PartnerCheckin, PartnerCheckinPayload},
    },
    services::subscription_service::is_platform_blocked,
};

/// Check-in de parceiros. O parceiro já validou quem é o usuário; aqui só
/// verificamos se a academia está acessível e registramos a entrada.
#[derive(Clone)]
pub struct CheckinService {
    subscriptions: Arc<dyn SubscriptionStore>,
    checkins: Arc<dyn CheckinSink>,
}

impl CheckinService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, checkins: Arc<dyn CheckinSink>) -> Self {
        Self { subscriptions, checkins }
    }

    pub async fn partner_checkin(
        &self,
        tenant_id: Uuid,
        payload: PartnerCheckinPayload,
        deadline: Instant,
    ) -> Result<CheckinVerdict, AppError> {
        if is_platform_blocked(self.subscriptions.as_ref(), tenant_id, deadline).await? {
            tracing::warn!("⛔ Check-in de parceiro recusado: academia {} bloqueada.", tenant_id);
            return Ok(CheckinVerdict::Denied(DenialReason::SystemBlocked));
        }

        if payload.validate().is_err() {
            return Ok(CheckinVerdict::Denied(DenialReason::InvalidPayload));
        }

        let checkin = within(
            deadline,
            self.checkins.append(NewPartnerCheckin {
                tenant_id,
                partner_user_id: payload.user_id,
                user_name: payload.user_name,
            }),
        )
        .await?;

        tracing::info!(
            "🤝 Check-in de parceiro registrado: {} ({}) na academia {}",
            checkin.user_name,
            checkin.partner_user_id,
            tenant_id
        );
        Ok(CheckinVerdict::Allowed(checkin))
    }

    pub async fn recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<PartnerCheckin>, AppError> {
        self.checkins.list_recent(tenant_id, limit).await
    }
}
