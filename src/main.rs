// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
#[cfg(test)]
mod test_support;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::tenant_guard;

/// Monta o roteador completo a partir do estado.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas da catraca e de parceiros (apenas X-Tenant-ID)
    let device_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/access/validate", post(handlers::access::validate_access))
        .route("/partners/checkin", post(handlers::checkin::partner_checkin))
        .route("/billing/payment-confirmed", post(handlers::subscription::payment_confirmed));

    // Rotas administrativas (JWT + X-Tenant-ID)
    let admin_routes = Router::new()
        .route("/access/logs", get(handlers::access::list_access_logs))
        .route("/partners/checkins", get(handlers::checkin::list_checkins))
        .route("/subscription", get(handlers::subscription::get_subscription))
        .route("/subscription/init", post(handlers::subscription::init_subscription))
        .route("/subscription/simulate", post(handlers::subscription::simulate_subscription))
        .route(
            "/employees/{id}",
            get(handlers::directory::get_employee).put(handlers::directory::save_employee),
        )
        .route(
            "/members/{id}",
            get(handlers::directory::get_member).put(handlers::directory::save_member),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    Router::new()
        .nest("/api", device_routes.merge(admin_routes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;

    // `catraca issue-token <user-id> <tenant-id>`: emite um token administrativo
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("issue-token") {
        let (Some(user_id), Some(tenant_id)) = (args.get(2), args.get(3)) else {
            anyhow::bail!("uso: catraca issue-token <user-id> <tenant-id>");
        };
        let token = services::AuthService::new(config.jwt_secret.clone())
            .create_token(Uuid::parse_str(user_id)?, Uuid::parse_str(tenant_id)?)?;
        println!("{token}");
        return Ok(());
    }

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização (apenas Postgres)
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!().run(pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let addr = app_state.config.bind_addr.clone();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, build_router(app_state)).await?;
    Ok(())
}
