pub mod access_log_repo;
pub use access_log_repo::{AccessLogRepository, AccessLogSink};
pub mod checkin_repo;
pub use checkin_repo::{CheckinRepository, CheckinSink};
pub mod employee_repo;
pub use employee_repo::{EmployeeDirectory, EmployeeRepository};
pub mod member_repo;
pub use member_repo::{MemberDirectory, MemberRepository};
pub mod payment_event_repo;
pub use payment_event_repo::{PaymentEventLedger, PaymentEventRepository};
pub mod subscription_repo;
pub use subscription_repo::{SubscriptionRepository, SubscriptionStore};
pub mod memory;

use std::sync::Arc;

use sqlx::PgPool;

use crate::common::error::AppError;

// Violação dos índices únicos de PIN vira conflito (409), não falha de sistema
pub(crate) fn upsert_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::PinConflict,
        other => AppError::DatabaseError(other),
    }
}

// Conjunto de repositórios que o AppState distribui aos serviços
#[derive(Clone)]
pub struct Repositories {
    pub employees: Arc<dyn EmployeeDirectory>,
    pub members: Arc<dyn MemberDirectory>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub access_log: Arc<dyn AccessLogSink>,
    pub checkins: Arc<dyn CheckinSink>,
    pub payment_events: Arc<dyn PaymentEventLedger>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            employees: Arc::new(EmployeeRepository::new(pool.clone())),
            members: Arc::new(MemberRepository::new(pool.clone())),
            subscriptions: Arc::new(SubscriptionRepository::new(pool.clone())),
            access_log: Arc::new(AccessLogRepository::new(pool.clone())),
            checkins: Arc::new(CheckinRepository::new(pool.clone())),
            payment_events: Arc::new(PaymentEventRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            employees: Arc::new(memory::InMemoryEmployeeDirectory::default()),
            members: Arc::new(memory::InMemoryMemberDirectory::default()),
            subscriptions: Arc::new(memory::InMemorySubscriptionStore::default()),
            access_log: Arc::new(memory::InMemoryAccessLog::default()),
            checkins: Arc::new(memory::InMemoryCheckins::default()),
            payment_events: Arc::new(memory::InMemoryPaymentEvents::default()),
        }
    }
}
