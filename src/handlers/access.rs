// src/handlers/access.rs

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::access::{AccessLogEntry, AccessPayload, AccessResponse, DenialReason},
};

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 500;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Quantidade de registros (padrão 50, máximo 500)
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
    }
}

// POST /api/access/validate
#[utoipa::path(
    post,
    path = "/api/access/validate",
    tag = "Access",
    request_body = AccessPayload,
    responses(
        (status = 200, description = "Acesso liberado", body = AccessResponse),
        (status = 400, description = "Payload da requisição inválido", body = AccessResponse),
        (status = 403, description = "Acesso bloqueado", body = AccessResponse),
        (status = 404, description = "PIN não encontrado", body = AccessResponse),
        (status = 500, description = "Erro interno no servidor", body = AccessResponse)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    )
)]
pub async fn validate_access(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    payload: Result<Json<AccessPayload>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        let body = AccessResponse::denied(&DenialReason::InvalidPayload, &locale);
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let result = app_state
        .access_service
        .validate_access(tenant.0, payload, app_state.request_deadline())
        .await;

    match result {
        Ok(verdict) => {
            let (status, body) = AccessResponse::from_verdict(&verdict, &locale);
            (status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!("🔥 Falha na validação de acesso da academia {}: {}", tenant.0, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(AccessResponse::internal_error(&locale)))
                .into_response()
        }
    }
}

// GET /api/access/logs
#[utoipa::path(
    get,
    path = "/api/access/logs",
    tag = "Access",
    responses(
        (status = 200, description = "Últimos acessos (mais recentes primeiro)", body = Vec<AccessLogEntry>)
    ),
    params(
        ListQuery,
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_access_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .access_service
        .recent_entries(tenant.0, query.limit())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(entries)))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::models::people::{EmployeeStatus, MemberStatus};
    use crate::models::subscription::SubscriptionStatus;
    use crate::test_support::{post_json, request, send, Fixture};

    const URI: &str = "/api/access/validate";

    #[tokio::test]
    async fn member_with_valid_plan_gets_in() {
        let fixture = Fixture::active().await;
        fixture
            .add_member("João Pereira", "9876", MemberStatus::Active, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
            .await;
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap();

        let (status, body) = send(
            fixture.router_at(now),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": "9876" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "allowed", "name": "João Pereira", "type": "member" }));
    }

    #[tokio::test]
    async fn expired_plan_is_forbidden_with_date() {
        let fixture = Fixture::active().await;
        fixture
            .add_member("João", "9876", MemberStatus::Active, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
            .await;
        let now = Utc.with_ymd_and_hms(2024, 5, 16, 15, 0, 0).unwrap();

        let (status, body) = send(
            fixture.router_at(now),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": "9876" })),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "denied");
        assert!(body["reason"].as_str().unwrap().contains("15/05/2024"));
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_requests() {
        let fixture = Fixture::active().await;

        for payload in [json!({ "pin": "12" }), json!({ "pin": 1234 }), json!({})] {
            let (status, body) = send(
                fixture.router(),
                post_json(URI, Some(fixture.tenant_id), payload),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "status": "denied", "reason": "Payload da requisição inválido." }));
        }
    }

    #[tokio::test]
    async fn unknown_pin_is_not_found() {
        let fixture = Fixture::active().await;
        let (status, body) = send(
            fixture.router(),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": "0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": "denied", "reason": "PIN não encontrado." }));
    }

    #[tokio::test]
    async fn blocked_tenant_is_forbidden() {
        let fixture = Fixture::new()
            .with_subscription(SubscriptionStatus::Blocked, Utc::now() + Duration::days(5))
            .await;
        fixture.add_employee("Carla", "1234", EmployeeStatus::Active).await;

        let (status, body) = send(
            fixture.router(),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": "1234" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "denied");
    }

    #[tokio::test]
    async fn wrongly_typed_body_is_rejected_before_the_platform_gate() {
        let fixture = Fixture::new()
            .with_subscription(SubscriptionStatus::Blocked, Utc::now() + Duration::days(5))
            .await;

        // JSON que não desserializa: 400 mesmo com a academia bloqueada
        let (status, body) = send(
            fixture.router(),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": 1234 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "Payload da requisição inválido.");

        // PIN bem tipado mas curto: o portão da plataforma vem antes
        let (status, body) = send(
            fixture.router(),
            post_json(URI, Some(fixture.tenant_id), json!({ "pin": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["reason"],
            "Acesso ao sistema bloqueado. Contate o administrador da plataforma."
        );
        assert!(fixture.access_log.entries().await.is_empty());
    }

    #[tokio::test]
    async fn english_reasons_on_request() {
        let fixture = Fixture::active().await;
        let request = request("POST", URI, Some(fixture.tenant_id))
            .header(header::ACCEPT_LANGUAGE, "en-US")
            .body(Body::from(json!({ "pin": "0000" }).to_string()))
            .unwrap();

        let (status, body) = send(fixture.router(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["reason"], "PIN not found.");
    }

    #[tokio::test]
    async fn tenant_header_is_required() {
        let fixture = Fixture::active().await;
        let (status, _) = send(fixture.router(), post_json(URI, None, json!({ "pin": "1234" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logs_require_a_token_for_the_same_tenant() {
        let fixture = Fixture::active().await;
        fixture.add_employee("Carla", "1234", EmployeeStatus::Active).await;
        send(fixture.router(), post_json(URI, Some(fixture.tenant_id), json!({ "pin": "1234" }))).await;

        let anonymous = request("GET", "/api/access/logs", Some(fixture.tenant_id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(fixture.router(), anonymous).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let other = Fixture::active().await;
        let wrong_tenant = request("GET", "/api/access/logs", Some(fixture.tenant_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", other.admin_token()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(fixture.router(), wrong_tenant).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let authorized = request("GET", "/api/access/logs?limit=10", Some(fixture.tenant_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", fixture.admin_token()))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(fixture.router(), authorized).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["outcome"], "Permitido");
        assert_eq!(entries[0]["actorKind"], "Funcionário");
        assert_eq!(entries[0]["method"], "PIN");
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(ListQuery { limit: None }.limit(), 50);
        assert_eq!(ListQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(ListQuery { limit: Some(10_000) }.limit(), 500);
    }
}
