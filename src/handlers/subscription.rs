// src/handlers/subscription.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use subtle::ConstantTimeEq;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::subscription::{
        PaymentConfirmedPayload, SimulateSubscriptionPayload, Subscription, SubscriptionOverview,
    },
};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

// Comparação em tempo constante
fn secret_matches(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented.ct_eq(expected).into()
}

// GET /api/subscription
#[utoipa::path(
    get,
    path = "/api/subscription",
    tag = "Subscription",
    responses(
        (status = 200, description = "Assinatura e status derivado", body = SubscriptionOverview)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .subscription_service
        .overview(tenant.0, app_state.request_deadline())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(overview)))
}

// POST /api/subscription/init
#[utoipa::path(
    post,
    path = "/api/subscription/init",
    tag = "Subscription",
    responses(
        (status = 200, description = "Assinatura vigente (criada em avaliação se ausente)", body = Subscription)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn init_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = app_state
        .subscription_service
        .ensure_initialized(tenant.0, app_state.request_deadline())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(subscription)))
}

// POST /api/subscription/simulate
#[utoipa::path(
    post,
    path = "/api/subscription/simulate",
    tag = "Subscription",
    request_body = SimulateSubscriptionPayload,
    responses(
        (status = 200, description = "Assinatura alterada", body = Subscription)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn simulate_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<SimulateSubscriptionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Simulação de assinatura solicitada por {}", user.0.sub);

    let subscription = app_state
        .subscription_service
        .simulate(tenant.0, &payload, app_state.request_deadline())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(subscription)))
}

// POST /api/billing/payment-confirmed
#[utoipa::path(
    post,
    path = "/api/billing/payment-confirmed",
    tag = "Billing",
    request_body = PaymentConfirmedPayload,
    responses(
        (status = 200, description = "Assinatura ativada", body = Subscription),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "Segredo do webhook inválido")
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia"),
        ("x-webhook-secret" = String, Header, description = "Segredo compartilhado com a ponte de pagamentos")
    )
)]
pub async fn payment_confirmed(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    headers: HeaderMap,
    payload: Result<Json<PaymentConfirmedPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // O segredo é conferido antes de olhar o corpo
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    if !secret_matches(presented, app_state.config.webhook_secret.as_bytes()) {
        return Err(AppError::InvalidWebhookSecret.to_api_error(&locale));
    }

    let Ok(Json(payload)) = payload else {
        return Err(AppError::InvalidPayload.to_api_error(&locale));
    };

    let subscription = app_state
        .subscription_service
        .on_payment_confirmed(tenant.0, &payload, app_state.request_deadline())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(subscription)))
}
