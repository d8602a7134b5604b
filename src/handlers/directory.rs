// src/handlers/directory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::people::{Employee, Member, UpsertEmployeePayload, UpsertMemberPayload},
};

// GET /api/employees/{id}
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Directory",
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do funcionário"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = app_state
        .directory_service
        .get_employee(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::RecordNotFound.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(employee)))
}

// PUT /api/employees/{id}
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Directory",
    request_body = UpsertEmployeePayload,
    responses(
        (status = 200, description = "Funcionário salvo", body = Employee),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "ID pertence a outra academia"),
        (status = 409, description = "PIN já em uso nesta academia")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do funcionário"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let employee = app_state
        .directory_service
        .save_employee(tenant.0, id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(employee)))
}

// GET /api/members/{id}
#[utoipa::path(
    get,
    path = "/api/members/{id}",
    tag = "Directory",
    responses(
        (status = 200, description = "Aluno", body = Member),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do aluno"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .directory_service
        .get_member(tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::RecordNotFound.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

// PUT /api/members/{id}
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    tag = "Directory",
    request_body = UpsertMemberPayload,
    responses(
        (status = 200, description = "Aluno salvo", body = Member),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "ID pertence a outra academia"),
        (status = 409, description = "PIN já em uso nesta academia")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do aluno"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let member = app_state
        .directory_service
        .save_member(tenant.0, id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(member)))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header};
    use serde_json::{json, Value};

    use super::*;
    use crate::db::MemberDirectory;
    use crate::models::people::MemberStatus;
    use crate::test_support::{request, send, Fixture};

    fn put(fixture: &Fixture, uri: &str, body: Value) -> axum::http::Request<Body> {
        request("PUT", uri, Some(fixture.tenant_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", fixture.admin_token()))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn member_body(pin: &str) -> Value {
        json!({
            "name": "Intruso",
            "status": "Ativo",
            "expiresOn": "2030-01-01",
            "accessPin": pin
        })
    }

    #[tokio::test]
    async fn member_of_another_tenant_cannot_be_overwritten() {
        let owner = Fixture::active().await;
        let member = owner
            .add_member("João", "1234", MemberStatus::Active, chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .await;

        let intruder = owner.other_tenant();
        let uri = format!("/api/members/{}", member.id);
        let (status, _) = send(intruder.router(), put(&intruder, &uri, member_body("5555"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let kept = owner.members.find_by_id(owner.tenant_id, member.id).await.unwrap();
        assert_eq!(kept.map(|m| m.name), Some("João".to_string()));
    }

    #[tokio::test]
    async fn duplicate_member_pin_is_a_conflict() {
        let fixture = Fixture::active().await;
        fixture
            .add_member("João", "1234", MemberStatus::Active, chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .await;

        let uri = format!("/api/members/{}", Uuid::new_v4());
        let (status, body) = send(fixture.router(), put(&fixture, &uri, member_body("1234"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Este PIN já está em uso nesta academia.");
    }
}
