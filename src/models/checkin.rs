// src/models/checkin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{middleware::i18n::Locale, models::access::DenialReason};

// Check-in vindo de parceiro (Gympass e afins). Coleção própria, separada do log de acesso.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerCheckin {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "gp-998877")]
    pub partner_user_id: String,
    #[schema(example = "Ana Lima")]
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPartnerCheckin {
    pub tenant_id: Uuid,
    pub partner_user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerCheckinPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "gp-998877")]
    pub user_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Lima")]
    pub user_name: String,
}

#[derive(Debug, Clone)]
pub enum CheckinVerdict {
    Allowed(PartnerCheckin),
    Denied(DenialReason),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckinResponse {
    Allowed {
        #[schema(example = "Check-in registrado com sucesso.")]
        message: String,
    },
    Denied {
        reason: String,
    },
}

impl CheckinResponse {
    pub fn registered(locale: &Locale) -> Self {
        CheckinResponse::Allowed {
            message: locale
                .pick("Check-in registrado com sucesso.", "Check-in registered successfully.")
                .to_string(),
        }
    }
}
