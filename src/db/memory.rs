// src/db/memory.rs
//
// Implementações em memória dos repositórios. Usadas pelos testes e pelo
// modo `STORAGE_BACKEND=memory` (demonstração sem Postgres).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AccessLogSink, CheckinSink, EmployeeDirectory, MemberDirectory, PaymentEventLedger,
        SubscriptionStore,
    },
    models::{
        access::{AccessLogEntry, NewAccessLogEntry},
        checkin::{NewPartnerCheckin, PartnerCheckin},
        people::{Employee, Member},
        subscription::{Subscription, UpsertSubscription},
    },
};

// Mesma regra dos índices únicos parciais: PIN único por diretório e academia.
fn pin_taken<'a>(
    mut rows: impl Iterator<Item = (Uuid, Uuid, Option<&'a str>)>,
    id: Uuid,
    tenant_id: Uuid,
    pin: Option<&str>,
) -> bool {
    let Some(pin) = pin else {
        return false;
    };
    rows.any(|(row_id, row_tenant, row_pin)| {
        row_id != id && row_tenant == tenant_id && row_pin == Some(pin)
    })
}

// ---
// Funcionários
// ---

#[derive(Default)]
pub struct InMemoryEmployeeDirectory {
    rows: RwLock<HashMap<Uuid, Employee>>,
    lookups: AtomicUsize,
}

#[cfg(test)]
impl InMemoryEmployeeDirectory {
    /// Quantas consultas (por PIN ou ID) já foram feitas.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Employee>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|e| e.tenant_id == tenant_id && e.pin.as_deref() == Some(pin))
            .cloned())
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|e| e.tenant_id == tenant_id).cloned())
    }

    async fn upsert(&self, employee: &Employee) -> Result<Employee, AppError> {
        let mut rows = self.rows.write().await;
        if rows.get(&employee.id).is_some_and(|e| e.tenant_id != employee.tenant_id) {
            return Err(AppError::RecordNotFound);
        }
        let others = rows.values().map(|e| (e.id, e.tenant_id, e.pin.as_deref()));
        if pin_taken(others, employee.id, employee.tenant_id, employee.pin.as_deref()) {
            return Err(AppError::PinConflict);
        }

        let mut saved = employee.clone();
        saved.updated_at = Utc::now();
        rows.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

// ---
// Alunos
// ---

#[derive(Default)]
pub struct InMemoryMemberDirectory {
    rows: RwLock<HashMap<Uuid, Member>>,
    lookups: AtomicUsize,
}

#[cfg(test)]
impl InMemoryMemberDirectory {
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Member>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|m| m.tenant_id == tenant_id && m.access_pin.as_deref() == Some(pin))
            .cloned())
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Member>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|m| m.tenant_id == tenant_id).cloned())
    }

    async fn upsert(&self, member: &Member) -> Result<Member, AppError> {
        let mut rows = self.rows.write().await;
        if rows.get(&member.id).is_some_and(|m| m.tenant_id != member.tenant_id) {
            return Err(AppError::RecordNotFound);
        }
        let others = rows.values().map(|m| (m.id, m.tenant_id, m.access_pin.as_deref()));
        if pin_taken(others, member.id, member.tenant_id, member.access_pin.as_deref()) {
            return Err(AppError::PinConflict);
        }

        let mut saved = member.clone();
        saved.updated_at = Utc::now();
        rows.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

// ---
// Assinaturas
// ---

#[derive(Default)]
pub struct InMemorySubscriptionStore {
    rows: RwLock<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionStore {
    fn to_row(input: &UpsertSubscription) -> Subscription {
        Subscription {
            tenant_id: input.tenant_id,
            plan: input.plan,
            status: input.status,
            expires_at: input.expires_at,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self, tenant_id: Uuid) -> Result<Option<Subscription>, AppError> {
        Ok(self.rows.read().await.get(&tenant_id).cloned())
    }

    async fn upsert(&self, input: &UpsertSubscription) -> Result<Subscription, AppError> {
        let mut rows = self.rows.write().await;
        if let Some(current) = rows.get(&input.tenant_id) {
            if input.matches(current) {
                return Ok(current.clone());
            }
        }
        let row = Self::to_row(input);
        rows.insert(input.tenant_id, row.clone());
        Ok(row)
    }

    async fn insert_if_absent(&self, input: &UpsertSubscription) -> Result<Subscription, AppError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .entry(input.tenant_id)
            .or_insert_with(|| Self::to_row(input));
        Ok(row.clone())
    }
}

// ---
// Log de acesso
// ---

#[derive(Default)]
pub struct InMemoryAccessLog {
    rows: RwLock<Vec<AccessLogEntry>>,
}

#[cfg(test)]
impl InMemoryAccessLog {
    pub async fn entries(&self) -> Vec<AccessLogEntry> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl AccessLogSink for InMemoryAccessLog {
    async fn append(&self, entry: NewAccessLogEntry) -> Result<AccessLogEntry, AppError> {
        let saved = AccessLogEntry {
            id: Uuid::new_v4(),
            tenant_id: entry.tenant_id,
            created_at: Utc::now(),
            actor_name: entry.actor_name,
            actor_email: entry.actor_email,
            actor_kind: entry.actor_kind,
            outcome: entry.outcome,
            block_reason: entry.block_reason,
            method: entry.method,
            collector: entry.collector,
            liberator: entry.liberator,
        };
        self.rows.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<AccessLogEntry>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|e| e.tenant_id == tenant_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

// ---
// Check-ins de parceiros
// ---

#[derive(Default)]
pub struct InMemoryCheckins {
    rows: RwLock<Vec<PartnerCheckin>>,
}

#[cfg(test)]
impl InMemoryCheckins {
    pub async fn entries(&self) -> Vec<PartnerCheckin> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl CheckinSink for InMemoryCheckins {
    async fn append(&self, checkin: NewPartnerCheckin) -> Result<PartnerCheckin, AppError> {
        let saved = PartnerCheckin {
            id: Uuid::new_v4(),
            tenant_id: checkin.tenant_id,
            partner_user_id: checkin.partner_user_id,
            user_name: checkin.user_name,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn list_recent(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<PartnerCheckin>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|c| c.tenant_id == tenant_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

// ---
// Eventos de pagamento
// ---

#[derive(Default)]
pub struct InMemoryPaymentEvents {
    seen: RwLock<HashSet<String>>,
}

#[async_trait]
impl PaymentEventLedger for InMemoryPaymentEvents {
    async fn contains(&self, event_id: &str) -> Result<bool, AppError> {
        Ok(self.seen.read().await.contains(event_id))
    }

    async fn record(&self, _tenant_id: Uuid, event_id: &str) -> Result<bool, AppError> {
        Ok(self.seen.write().await.insert(event_id.to_string()))
    }
}
