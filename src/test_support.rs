// src/test_support.rs
//
// Montagem de repositórios em memória com dados de exemplo para os testes.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{
        memory::{
            InMemoryAccessLog, InMemoryCheckins, InMemoryEmployeeDirectory,
            InMemoryMemberDirectory, InMemoryPaymentEvents, InMemorySubscriptionStore,
        },
        EmployeeDirectory, MemberDirectory, Repositories, SubscriptionStore,
    },
    models::{
        people::{Employee, EmployeeRole, EmployeeStatus, Member, MemberStatus},
        subscription::{SubscriptionPlan, SubscriptionStatus, UpsertSubscription},
    },
};

pub struct Fixture {
    pub tenant_id: Uuid,
    pub employees: Arc<InMemoryEmployeeDirectory>,
    pub members: Arc<InMemoryMemberDirectory>,
    pub subscriptions: Arc<InMemorySubscriptionStore>,
    pub access_log: Arc<InMemoryAccessLog>,
    pub checkins: Arc<InMemoryCheckins>,
    pub payment_events: Arc<InMemoryPaymentEvents>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            employees: Arc::default(),
            members: Arc::default(),
            subscriptions: Arc::default(),
            access_log: Arc::default(),
            checkins: Arc::default(),
            payment_events: Arc::default(),
        }
    }

    /// Outra academia sobre os mesmos repositórios.
    pub fn other_tenant(&self) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            employees: self.employees.clone(),
            members: self.members.clone(),
            subscriptions: self.subscriptions.clone(),
            access_log: self.access_log.clone(),
            checkins: self.checkins.clone(),
            payment_events: self.payment_events.clone(),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            employees: self.employees.clone(),
            members: self.members.clone(),
            subscriptions: self.subscriptions.clone(),
            access_log: self.access_log.clone(),
            checkins: self.checkins.clone(),
            payment_events: self.payment_events.clone(),
        }
    }

    pub async fn with_subscription(self, status: SubscriptionStatus, expires_at: DateTime<Utc>) -> Self {
        self.subscriptions
            .upsert(&UpsertSubscription {
                tenant_id: self.tenant_id,
                plan: SubscriptionPlan::Pro,
                status,
                expires_at,
            })
            .await
            .unwrap();
        self
    }

    /// Academia com assinatura ativa por mais 30 dias.
    pub async fn active() -> Self {
        Self::new()
            .with_subscription(SubscriptionStatus::Active, Utc::now() + Duration::days(30))
            .await
    }

    pub async fn add_employee(&self, name: &str, pin: &str, status: EmployeeStatus) -> Employee {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            name: name.to_string(),
            email: format!("{}@academia.com", name.to_lowercase().replace(' ', ".")),
            login: name.to_lowercase().replace(' ', "."),
            role: EmployeeRole::Reception,
            status,
            pin: Some(pin.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.employees.upsert(&employee).await.unwrap()
    }

    pub async fn add_member(
        &self,
        name: &str,
        pin: &str,
        status: MemberStatus,
        expires_on: NaiveDate,
    ) -> Member {
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            name: name.to_string(),
            email: None,
            phone: None,
            plan_name: Some("Mensal".to_string()),
            status,
            expires_on,
            access_pin: Some(pin.to_string()),
            cpf: None,
            goals: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.members.upsert(&member).await.unwrap()
    }
}

// ---
// Apoio aos testes HTTP
// ---

pub const TEST_JWT_SECRET: &str = "segredo-de-teste";
pub const TEST_WEBHOOK_SECRET: &str = "webhook-de-teste";

pub fn test_config() -> crate::config::Config {
    crate::config::Config {
        storage: crate::config::StorageBackend::Memory,
        database_url: None,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        repository_timeout: std::time::Duration::from_secs(2),
        utc_offset: chrono::FixedOffset::west_opt(3 * 3600).unwrap(),
        trial_days: 7,
    }
}

impl Fixture {
    pub fn router_at(&self, now: DateTime<Utc>) -> axum::Router {
        let state = crate::config::AppState::from_repositories(
            test_config(),
            None,
            self.repositories(),
            Arc::new(crate::common::clock::FixedClock(now)),
        );
        crate::build_router(state)
    }

    pub fn router(&self) -> axum::Router {
        self.router_at(Utc::now())
    }

    /// Bearer token de administrador desta academia.
    pub fn admin_token(&self) -> String {
        crate::services::AuthService::new(TEST_JWT_SECRET.to_string())
            .create_token(Uuid::new_v4(), self.tenant_id)
            .unwrap()
    }
}

/// Dispara uma requisição no roteador e devolve status e corpo JSON.
pub async fn send(
    router: axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use tower::ServiceExt;

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

pub fn request(method: &str, uri: &str, tenant_id: Option<Uuid>) -> axum::http::request::Builder {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json");
    if let Some(tenant_id) = tenant_id {
        builder = builder.header(crate::middleware::tenancy::TENANT_ID_HEADER, tenant_id.to_string());
    }
    builder
}

pub fn post_json(
    uri: &str,
    tenant_id: Option<Uuid>,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    request("POST", uri, tenant_id)
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}
