// src/handlers/checkin.rs

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::access::ListQuery,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        access::DenialReason,
        checkin::{CheckinResponse, CheckinVerdict, PartnerCheckin, PartnerCheckinPayload},
    },
};

fn denied(reason: &DenialReason, locale: &Locale) -> Response {
    let body = CheckinResponse::Denied { reason: reason.message(locale) };
    (reason.http_status(), Json(body)).into_response()
}

// POST /api/partners/checkin
#[utoipa::path(
    post,
    path = "/api/partners/checkin",
    tag = "Partners",
    request_body = PartnerCheckinPayload,
    responses(
        (status = 200, description = "Check-in registrado", body = CheckinResponse),
        (status = 400, description = "Payload inválido", body = CheckinResponse),
        (status = 403, description = "Academia bloqueada", body = CheckinResponse),
        (status = 500, description = "Erro interno", body = CheckinResponse)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    )
)]
pub async fn partner_checkin(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    payload: Result<Json<PartnerCheckinPayload>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return denied(&DenialReason::InvalidPayload, &locale);
    };

    let result = app_state
        .checkin_service
        .partner_checkin(tenant.0, payload, app_state.request_deadline())
        .await;

    match result {
        Ok(CheckinVerdict::Allowed(checkin)) => {
            tracing::debug!("Check-in {} gravado às {}", checkin.id, checkin.created_at);
            (StatusCode::OK, Json(CheckinResponse::registered(&locale))).into_response()
        }
        Ok(CheckinVerdict::Denied(reason)) => denied(&reason, &locale),
        Err(e) => {
            tracing::error!("🔥 Falha no check-in de parceiro da academia {}: {}", tenant.0, e);
            let body = CheckinResponse::Denied {
                reason: locale
                    .pick("Erro interno no servidor.", "Internal server error.")
                    .to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

// GET /api/partners/checkins
#[utoipa::path(
    get,
    path = "/api/partners/checkins",
    tag = "Partners",
    responses(
        (status = 200, description = "Últimos check-ins de parceiros", body = Vec<PartnerCheckin>)
    ),
    params(
        ListQuery,
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_checkins(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let checkins = app_state
        .checkin_service
        .recent(tenant.0, query.limit())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(checkins)))
}
