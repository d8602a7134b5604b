// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::Claims,
};

// Extrator para obter o administrador autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

/// Exige um Bearer token válido emitido para a academia do cabeçalho X-Tenant-ID.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let locale = Locale::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_or_default();
    let tenant = TenantContext::from_request_parts(&mut parts, &app_state).await?;

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

    let claims = app_state
        .auth_service
        .validate_token(token)
        .map_err(|e| e.to_api_error(&locale))?;

    if claims.tenant_id != tenant.0 {
        return Err(AppError::TenantMismatch.to_api_error(&locale));
    }

    // Insere o usuário nos "extensions" da requisição
    parts.extensions.insert(AuthenticatedUser(claims));
    Ok(next.run(Request::from_parts(parts, body)).await)
}
