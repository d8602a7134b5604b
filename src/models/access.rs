// src/models/access.rs

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{middleware::i18n::Locale, models::people::MemberStatus};

pub const DEFAULT_COLLECTOR: &str = "Catraca";
pub const SYSTEM_LIBERATOR: &str = "Sistema";

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "access_actor_kind", rename_all = "snake_case")]
pub enum ActorKind {
    #[serde(rename = "Aluno")]
    Member,
    #[serde(rename = "Funcionário")]
    Employee,
}

impl ActorKind {
    /// Valor do campo `type` na resposta da catraca.
    pub fn slug(&self) -> &'static str {
        match self {
            ActorKind::Member => "member",
            ActorKind::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "access_outcome", rename_all = "snake_case")]
pub enum AccessOutcome {
    #[serde(rename = "Permitido")]
    Granted,
    #[serde(rename = "Bloqueado")]
    Blocked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "identification_method", rename_all = "snake_case")]
pub enum IdentificationMethod {
    #[default]
    #[serde(rename = "PIN")]
    Pin,
    #[serde(rename = "Biometria")]
    Biometric,
    #[serde(rename = "Facial")]
    Facial,
}

// ---
// Log de acesso (append-only)
// ---

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccessLogEntry {
    pub tenant_id: Uuid,
    pub actor_name: String,
    pub actor_email: Option<String>,
    // Ausente quando o PIN não pertence a ninguém
    pub actor_kind: Option<ActorKind>,
    pub outcome: AccessOutcome,
    pub block_reason: Option<String>,
    pub method: IdentificationMethod,
    pub collector: String,
    pub liberator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    // Definido pelo repositório no momento da escrita
    pub created_at: DateTime<Utc>,
    pub actor_name: String,
    pub actor_email: Option<String>,
    pub actor_kind: Option<ActorKind>,
    pub outcome: AccessOutcome,
    pub block_reason: Option<String>,
    pub method: IdentificationMethod,
    #[schema(example = "Catraca")]
    pub collector: String,
    #[schema(example = "Sistema")]
    pub liberator: String,
}

// ---
// Requisição da catraca
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessPayload {
    #[validate(length(min = 4, max = 6, message = "O PIN deve ter entre 4 e 6 caracteres."))]
    #[schema(example = "1234")]
    pub pin: String,

    pub method: Option<IdentificationMethod>,

    // Identificador do dispositivo coletor
    #[schema(example = "Catraca Principal")]
    pub collector: Option<String>,
}

#[cfg(test)]
impl AccessPayload {
    pub fn pin(pin: impl Into<String>) -> Self {
        Self { pin: pin.into(), method: None, collector: None }
    }
}

// ---
// Veredito
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    SystemBlocked,
    InvalidPayload,
    EmployeeInactive,
    MemberInactive { status: MemberStatus },
    PlanExpired { expired_on: NaiveDate },
    PinNotFound,
}

impl DenialReason {
    pub fn http_status(&self) -> StatusCode {
        match self {
            DenialReason::InvalidPayload => StatusCode::BAD_REQUEST,
            DenialReason::PinNotFound => StatusCode::NOT_FOUND,
            DenialReason::SystemBlocked
            | DenialReason::EmployeeInactive
            | DenialReason::MemberInactive { .. }
            | DenialReason::PlanExpired { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Mensagem devolvida ao dispositivo/cliente.
    pub fn message(&self, locale: &Locale) -> String {
        match self {
            DenialReason::SystemBlocked => locale
                .pick(
                    "Acesso ao sistema bloqueado. Contate o administrador da plataforma.",
                    "System access blocked. Contact the platform administrator.",
                )
                .to_string(),
            DenialReason::InvalidPayload => locale
                .pick("Payload da requisição inválido.", "Invalid request payload.")
                .to_string(),
            DenialReason::EmployeeInactive => locale
                .pick("Acesso de funcionário inativo.", "Employee access inactive.")
                .to_string(),
            DenialReason::MemberInactive { .. } => locale
                .pick("Aluno inativo ou com pendências.", "Member inactive or with pending issues.")
                .to_string(),
            DenialReason::PlanExpired { expired_on } => {
                let date = locale.format_date(*expired_on);
                if locale.is_english() {
                    format!("Plan expired on {date}.")
                } else {
                    format!("Plano vencido em {date}.")
                }
            }
            DenialReason::PinNotFound => locale
                .pick("PIN não encontrado.", "PIN not found.")
                .to_string(),
        }
    }

    /// Motivo gravado no log de acesso (sempre em português).
    pub fn log_reason(&self) -> String {
        match self {
            DenialReason::EmployeeInactive => "Funcionário inativo".to_string(),
            DenialReason::MemberInactive { status } => format!("Status: {}", status.label()),
            DenialReason::PlanExpired { expired_on } => {
                format!("Plano vencido em {}", expired_on.format("%d/%m/%Y"))
            }
            DenialReason::PinNotFound => "PIN não encontrado".to_string(),
            DenialReason::SystemBlocked => "Sistema bloqueado".to_string(),
            DenialReason::InvalidPayload => "Payload inválido".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessVerdict {
    Allowed { actor_name: String, actor_kind: ActorKind },
    Denied(DenialReason),
}

#[cfg(test)]
impl AccessVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessVerdict::Allowed { .. })
    }
}

// ---
// Corpo JSON da resposta da catraca
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AccessResponse {
    Allowed {
        #[schema(example = "Carla Souza")]
        name: String,
        #[serde(rename = "type")]
        #[schema(example = "employee")]
        kind: String,
    },
    Denied {
        #[schema(example = "PIN não encontrado.")]
        reason: String,
    },
}

impl AccessResponse {
    pub fn from_verdict(verdict: &AccessVerdict, locale: &Locale) -> (StatusCode, Self) {
        match verdict {
            AccessVerdict::Allowed { actor_name, actor_kind } => (
                StatusCode::OK,
                AccessResponse::Allowed {
                    name: actor_name.clone(),
                    kind: actor_kind.slug().to_string(),
                },
            ),
            AccessVerdict::Denied(reason) => (reason.http_status(), Self::denied(reason, locale)),
        }
    }

    pub fn denied(reason: &DenialReason, locale: &Locale) -> Self {
        AccessResponse::Denied { reason: reason.message(locale) }
    }

    pub fn internal_error(locale: &Locale) -> Self {
        AccessResponse::Denied {
            reason: locale
                .pick("Erro interno no servidor.", "Internal server error.")
                .to_string(),
        }
    }
}
