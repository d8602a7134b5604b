// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::time::Instant;

use crate::{
    common::clock::{Clock, SystemClock},
    db::Repositories,
    services::{AccessService, AuthService, CheckinService, DirectoryService, SubscriptionService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub webhook_secret: String,
    pub bind_addr: String,
    pub repository_timeout: Duration,
    pub utc_offset: FixedOffset,
    pub trial_days: i64,
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} contém um valor inválido: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") | Err(_) => StorageBackend::Postgres,
            Ok(other) => anyhow::bail!("STORAGE_BACKEND desconhecido: {other}"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida");
        }

        let offset_minutes: i32 = var_or("TENANT_UTC_OFFSET_MINUTES", -180)?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .context("TENANT_UTC_OFFSET_MINUTES fora do intervalo")?;

        Ok(Self {
            storage,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            webhook_secret: env::var("WEBHOOK_SECRET").context("WEBHOOK_SECRET deve ser definido")?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            repository_timeout: Duration::from_millis(var_or("REPOSITORY_TIMEOUT_MS", 3000)?),
            utc_offset,
            trial_days: var_or("TRIAL_DAYS", 7)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: Option<PgPool>,
    pub auth_service: AuthService,
    pub access_service: AccessService,
    pub checkin_service: CheckinService,
    pub subscription_service: SubscriptionService,
    pub directory_service: DirectoryService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (db_pool, repos) = match (&config.storage, &config.database_url) {
            (StorageBackend::Postgres, Some(database_url)) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                (Some(pool.clone()), Repositories::postgres(pool))
            }
            (StorageBackend::Postgres, None) => anyhow::bail!("DATABASE_URL deve ser definida"),
            (StorageBackend::Memory, _) => {
                tracing::warn!("⚠️ Usando repositórios em memória: nada será persistido.");
                (None, Repositories::in_memory())
            }
        };

        Ok(Self::from_repositories(config, db_pool, repos, Arc::new(SystemClock)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_repositories(
        config: Config,
        db_pool: Option<PgPool>,
        repos: Repositories,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let access_service = AccessService::new(
            repos.subscriptions.clone(),
            repos.employees.clone(),
            repos.members.clone(),
            repos.access_log.clone(),
            clock.clone(),
            config.utc_offset,
        );
        let checkin_service = CheckinService::new(repos.subscriptions.clone(), repos.checkins.clone());
        let subscription_service = SubscriptionService::new(
            repos.subscriptions.clone(),
            repos.payment_events.clone(),
            clock,
            config.trial_days,
        );
        let directory_service = DirectoryService::new(repos.employees, repos.members);
        let auth_service = AuthService::new(config.jwt_secret.clone());

        Self {
            config: Arc::new(config),
            db_pool,
            auth_service,
            access_service,
            checkin_service,
            subscription_service,
            directory_service,
        }
    }

    /// Prazo para as consultas de uma avaliação iniciada agora.
    pub fn request_deadline(&self) -> Instant {
        Instant::now() + self.config.repository_timeout
    }
}
