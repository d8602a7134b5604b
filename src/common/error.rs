use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Erro interno da aplicação. Vira `ApiError` na fronteira HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload da requisição inválido")]
    InvalidPayload,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Segredo do webhook inválido")]
    InvalidWebhookSecret,

    #[error("Token não pertence a esta academia")]
    TenantMismatch,

    #[error("Registro não encontrado")]
    RecordNotFound,

    #[error("PIN já está em uso nesta academia")]
    PinConflict,

    #[error("Tempo limite excedido ao consultar o repositório")]
    Timeout,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro pronto para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let (status, message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: locale
                        .pick("Um ou mais campos são inválidos.", "One or more fields are invalid.")
                        .to_string(),
                    details: Some(Value::Object(details)),
                };
            }
            AppError::InvalidPayload => (
                StatusCode::BAD_REQUEST,
                locale.pick("Payload da requisição inválido.", "Invalid request payload."),
            ),
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                locale.pick(
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
            ),
            AppError::InvalidWebhookSecret => (
                StatusCode::UNAUTHORIZED,
                locale.pick("Assinatura do webhook inválida.", "Invalid webhook signature."),
            ),
            AppError::TenantMismatch => (
                StatusCode::FORBIDDEN,
                locale.pick(
                    "Você não tem acesso a esta academia.",
                    "You do not have access to this gym.",
                ),
            ),
            AppError::RecordNotFound => (
                StatusCode::NOT_FOUND,
                locale.pick("Registro não encontrado.", "Record not found."),
            ),
            AppError::PinConflict => (
                StatusCode::CONFLICT,
                locale.pick(
                    "Este PIN já está em uso nesta academia.",
                    "This PIN is already in use at this gym.",
                ),
            ),
            // Falhas de sistema: loga o detalhe, devolve mensagem genérica
            e @ (AppError::Timeout
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    locale.pick("Ocorreu um erro inesperado.", "An unexpected error occurred."),
                )
            }
        };

        ApiError {
            status,
            error: message.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
