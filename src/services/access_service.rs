// src/services/access_service.rs

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use tokio::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::Clock, deadline::within, error::AppError},
    db::{AccessLogSink, EmployeeDirectory, MemberDirectory, SubscriptionStore},
    models::access::{
        AccessLogEntry, AccessOutcome, AccessPayload, AccessVerdict, ActorKind, DenialReason,
        IdentificationMethod, NewAccessLogEntry, DEFAULT_COLLECTOR, SYSTEM_LIBERATOR,
    },
    models::people::MemberStatus,
    services::subscription_service::is_platform_blocked,
};

// Dados da tentativa que acompanham cada linha do log
struct Attempt {
    tenant_id: Uuid,
    method: IdentificationMethod,
    collector: String,
}

// Quem foi identificado (ou o rótulo sintético do PIN desconhecido)
struct Actor {
    name: String,
    email: Option<String>,
    kind: Option<ActorKind>,
}

/// Motor de decisão da catraca.
///
/// Ordem estrita, cada passo encerra a avaliação:
/// assinatura da plataforma -> formato do PIN -> funcionários -> alunos.
#[derive(Clone)]
pub struct AccessService {
    subscriptions: Arc<dyn SubscriptionStore>,
    employees: Arc<dyn EmployeeDirectory>,
    members: Arc<dyn MemberDirectory>,
    access_log: Arc<dyn AccessLogSink>,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
}

impl AccessService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        employees: Arc<dyn EmployeeDirectory>,
        members: Arc<dyn MemberDirectory>,
        access_log: Arc<dyn AccessLogSink>,
        clock: Arc<dyn Clock>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self { subscriptions, employees, members, access_log, clock, utc_offset }
    }

    pub async fn validate_access(
        &self,
        tenant_id: Uuid,
        payload: AccessPayload,
        deadline: Instant,
    ) -> Result<AccessVerdict, AppError> {
        // 1. Portão da plataforma (sem log: não é um evento de identidade)
        if is_platform_blocked(self.subscriptions.as_ref(), tenant_id, deadline).await? {
            tracing::warn!("⛔ Academia {} bloqueada, acesso negado sem consulta.", tenant_id);
            return Ok(AccessVerdict::Denied(DenialReason::SystemBlocked));
        }

        // 2. Formato do PIN (sem log)
        if payload.validate().is_err() {
            return Ok(AccessVerdict::Denied(DenialReason::InvalidPayload));
        }

        let attempt = Attempt {
            tenant_id,
            method: payload.method.unwrap_or_default(),
            collector: payload
                .collector
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLLECTOR.to_string()),
        };
        let pin = payload.pin.as_str();

        // 3. Funcionários têm precedência sobre alunos com o mesmo PIN
        if let Some(employee) = within(deadline, self.employees.find_by_pin(tenant_id, pin)).await? {
            let actor = Actor {
                name: employee.name.clone(),
                email: Some(employee.email.clone()),
                kind: Some(ActorKind::Employee),
            };
            let verdict = if employee.is_active() {
                AccessVerdict::Allowed {
                    actor_name: employee.name,
                    actor_kind: ActorKind::Employee,
                }
            } else {
                AccessVerdict::Denied(DenialReason::EmployeeInactive)
            };
            return Ok(self.conclude(&attempt, actor, verdict, deadline).await);
        }

        // 4. Alunos
        let Some(member) = within(deadline, self.members.find_by_pin(tenant_id, pin)).await? else {
            let actor = Actor {
                name: format!("Desconhecido (PIN: {pin})"),
                email: None,
                kind: None,
            };
            let verdict = AccessVerdict::Denied(DenialReason::PinNotFound);
            return Ok(self.conclude(&attempt, actor, verdict, deadline).await);
        };

        let actor = Actor {
            name: member.name.clone(),
            email: member.email.clone(),
            kind: Some(ActorKind::Member),
        };
        let verdict = if member.status != MemberStatus::Active {
            AccessVerdict::Denied(DenialReason::MemberInactive { status: member.status })
        } else if member.is_expired_on(self.today()) {
            AccessVerdict::Denied(DenialReason::PlanExpired { expired_on: member.expires_on })
        } else {
            AccessVerdict::Allowed {
                actor_name: member.name,
                actor_kind: ActorKind::Member,
            }
        };
        Ok(self.conclude(&attempt, actor, verdict, deadline).await)
    }

    pub async fn recent_entries(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<AccessLogEntry>, AppError> {
        self.access_log.list_recent(tenant_id, limit).await
    }

    // Data local da academia; o vencimento do aluno não tem hora.
    fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.utc_offset).date_naive()
    }

    /// Grava exatamente uma linha de log para o veredito e o devolve.
    async fn conclude(
        &self,
        attempt: &Attempt,
        actor: Actor,
        verdict: AccessVerdict,
        deadline: Instant,
    ) -> AccessVerdict {
        let (outcome, block_reason) = match &verdict {
            AccessVerdict::Allowed { .. } => (AccessOutcome::Granted, None),
            AccessVerdict::Denied(reason) => (AccessOutcome::Blocked, Some(reason.log_reason())),
        };

        match &verdict {
            AccessVerdict::Allowed { .. } => tracing::info!(
                "✅ Acesso liberado: {} ({:?}) na academia {}",
                actor.name,
                attempt.method,
                attempt.tenant_id
            ),
            AccessVerdict::Denied(reason) => tracing::warn!(
                "🚫 Acesso bloqueado: {} na academia {}: {}",
                actor.name,
                attempt.tenant_id,
                reason.log_reason()
            ),
        }

        let entry = NewAccessLogEntry {
            tenant_id: attempt.tenant_id,
            actor_name: actor.name,
            actor_email: actor.email,
            actor_kind: actor.kind,
            outcome,
            block_reason,
            method: attempt.method,
            collector: attempt.collector.clone(),
            liberator: SYSTEM_LIBERATOR.to_string(),
        };

        // O log é best-effort: uma falha aqui não muda o veredito
        if let Err(e) = within(deadline, self.access_log.append(entry)).await {
            tracing::warn!("Falha ao gravar log de acesso da academia {}: {}", attempt.tenant_id, e);
        }

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::FixedClock;
    use crate::models::people::{Employee, EmployeeStatus, Member};
    use crate::models::subscription::SubscriptionStatus;
    use crate::test_support::Fixture;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn brasilia() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn service_at(fixture: &Fixture, now: DateTime<Utc>) -> AccessService {
        AccessService::new(
            fixture.subscriptions.clone(),
            fixture.employees.clone(),
            fixture.members.clone(),
            fixture.access_log.clone(),
            Arc::new(FixedClock(now)),
            brasilia(),
        )
    }

    fn service(fixture: &Fixture) -> AccessService {
        service_at(fixture, Utc::now())
    }

    fn deadline() -> Instant {
        Instant::now() + std::time::Duration::from_secs(5)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn malformed_pins_are_rejected_without_log() {
        let fixture = Fixture::active().await;
        fixture.add_member("João", "1234", MemberStatus::Active, date(2099, 1, 1)).await;
        let service = service(&fixture);

        for pin in ["", "1", "123", "1234567", "12345678901"] {
            let verdict = service
                .validate_access(fixture.tenant_id, AccessPayload::pin(pin), deadline())
                .await
                .unwrap();
            assert_eq!(verdict, AccessVerdict::Denied(DenialReason::InvalidPayload), "pin {pin:?}");
        }
        assert!(fixture.access_log.entries().await.is_empty());
        assert_eq!(fixture.employees.lookup_count(), 0);
    }

    #[tokio::test]
    async fn missing_subscription_blocks_everything() {
        let fixture = Fixture::new();
        fixture.add_employee("Carla", "1234", EmployeeStatus::Active).await;
        let service = service(&fixture);

        let verdict = service
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), deadline())
            .await
            .unwrap();
        assert_eq!(verdict, AccessVerdict::Denied(DenialReason::SystemBlocked));
        assert_eq!(fixture.employees.lookup_count(), 0);
        assert_eq!(fixture.members.lookup_count(), 0);
        assert!(fixture.access_log.entries().await.is_empty());
    }

    #[tokio::test]
    async fn blocked_subscription_wins_over_bad_payload() {
        let fixture = Fixture::new()
            .with_subscription(SubscriptionStatus::Blocked, Utc::now() + Duration::days(30))
            .await;
        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("1"), deadline())
            .await
            .unwrap();
        assert_eq!(verdict, AccessVerdict::Denied(DenialReason::SystemBlocked));
    }

    #[tokio::test]
    async fn overdue_stored_status_still_lets_people_in() {
        let fixture = Fixture::new()
            .with_subscription(SubscriptionStatus::Overdue, Utc::now() - Duration::days(3))
            .await;
        fixture.add_employee("Carla", "4321", EmployeeStatus::Active).await;
        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("4321"), deadline())
            .await
            .unwrap();
        assert!(verdict.is_allowed());
    }

    #[tokio::test]
    async fn employee_pin_shadows_member_pin() {
        let fixture = Fixture::active().await;
        fixture.add_employee("Carla Souza", "1234", EmployeeStatus::Active).await;
        fixture.add_member("João", "1234", MemberStatus::Active, date(2099, 1, 1)).await;

        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), deadline())
            .await
            .unwrap();

        assert_eq!(
            verdict,
            AccessVerdict::Allowed {
                actor_name: "Carla Souza".into(),
                actor_kind: ActorKind::Employee,
            }
        );
        assert_eq!(fixture.members.lookup_count(), 0);

        let log = fixture.access_log.entries().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].outcome, AccessOutcome::Granted);
        assert_eq!(log[0].actor_kind, Some(ActorKind::Employee));
        assert_eq!(log[0].method, IdentificationMethod::Pin);
        assert_eq!(log[0].liberator, "Sistema");
        assert_eq!(log[0].collector, "Catraca");
    }

    #[tokio::test]
    async fn inactive_employee_is_denied_and_logged() {
        let fixture = Fixture::active().await;
        fixture.add_employee("Carla", "1234", EmployeeStatus::Inactive).await;
        // Aluno ativo com o mesmo PIN não é consultado
        fixture.add_member("João", "1234", MemberStatus::Active, date(2099, 1, 1)).await;

        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), deadline())
            .await
            .unwrap();

        assert_eq!(verdict, AccessVerdict::Denied(DenialReason::EmployeeInactive));
        let log = fixture.access_log.entries().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].outcome, AccessOutcome::Blocked);
        assert_eq!(log[0].block_reason.as_deref(), Some("Funcionário inativo"));
    }

    #[tokio::test]
    async fn inactive_member_reports_status() {
        let fixture = Fixture::active().await;
        fixture.add_member("João", "5555", MemberStatus::Overdue, date(2099, 1, 1)).await;

        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("5555"), deadline())
            .await
            .unwrap();

        assert_eq!(
            verdict,
            AccessVerdict::Denied(DenialReason::MemberInactive { status: MemberStatus::Overdue })
        );
        let log = fixture.access_log.entries().await;
        assert_eq!(log[0].block_reason.as_deref(), Some("Status: Atrasado"));
        assert_eq!(log[0].actor_kind, Some(ActorKind::Member));
    }

    #[tokio::test]
    async fn plan_expiry_is_date_only() {
        let fixture = Fixture::active().await;
        fixture.add_member("João", "9876", MemberStatus::Active, date(2024, 5, 15)).await;

        // 23:30 em Brasília ainda é o dia do vencimento
        let same_day = Utc.with_ymd_and_hms(2024, 5, 16, 2, 30, 0).unwrap();
        let verdict = service_at(&fixture, same_day)
            .validate_access(fixture.tenant_id, AccessPayload::pin("9876"), deadline())
            .await
            .unwrap();
        assert_eq!(
            verdict,
            AccessVerdict::Allowed { actor_name: "João".into(), actor_kind: ActorKind::Member }
        );

        let next_day = Utc.with_ymd_and_hms(2024, 5, 16, 12, 0, 0).unwrap();
        let verdict = service_at(&fixture, next_day)
            .validate_access(fixture.tenant_id, AccessPayload::pin("9876"), deadline())
            .await
            .unwrap();
        assert_eq!(
            verdict,
            AccessVerdict::Denied(DenialReason::PlanExpired { expired_on: date(2024, 5, 15) })
        );

        let log = fixture.access_log.entries().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].outcome, AccessOutcome::Granted);
        assert_eq!(log[1].block_reason.as_deref(), Some("Plano vencido em 15/05/2024"));
    }

    #[tokio::test]
    async fn unknown_pin_is_logged_with_synthetic_actor() {
        let fixture = Fixture::active().await;

        let verdict = service(&fixture)
            .validate_access(
                fixture.tenant_id,
                AccessPayload {
                    pin: "0000".into(),
                    method: Some(IdentificationMethod::Facial),
                    collector: Some("Catraca Lateral".into()),
                },
                deadline(),
            )
            .await
            .unwrap();

        assert_eq!(verdict, AccessVerdict::Denied(DenialReason::PinNotFound));
        let log = fixture.access_log.entries().await;
        assert_eq!(log.len(), 1);
        assert!(log[0].actor_name.contains("0000"));
        assert_eq!(log[0].actor_kind, None);
        assert_eq!(log[0].method, IdentificationMethod::Facial);
        assert_eq!(log[0].collector, "Catraca Lateral");
        assert_eq!(log[0].block_reason.as_deref(), Some("PIN não encontrado"));
    }

    #[tokio::test]
    async fn pins_do_not_leak_across_tenants() {
        let fixture = Fixture::active().await;
        let other = Fixture::active().await;
        other.add_employee("Outra", "1234", EmployeeStatus::Active).await;

        let verdict = service(&fixture)
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), deadline())
            .await
            .unwrap();
        assert_eq!(verdict, AccessVerdict::Denied(DenialReason::PinNotFound));
    }

    // --- Falhas de repositório ---

    struct BrokenMembers;

    #[async_trait]
    impl MemberDirectory for BrokenMembers {
        async fn find_by_pin(&self, _: Uuid, _: &str) -> Result<Option<Member>, AppError> {
            Err(anyhow::anyhow!("conexão recusada").into())
        }
        async fn find_by_id(&self, _: Uuid, _: Uuid) -> Result<Option<Member>, AppError> {
            Err(anyhow::anyhow!("conexão recusada").into())
        }
        async fn upsert(&self, _: &Member) -> Result<Member, AppError> {
            Err(anyhow::anyhow!("conexão recusada").into())
        }
    }

    struct StalledEmployees;

    #[async_trait]
    impl EmployeeDirectory for StalledEmployees {
        async fn find_by_pin(&self, _: Uuid, _: &str) -> Result<Option<Employee>, AppError> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(None)
        }
        async fn find_by_id(&self, _: Uuid, _: Uuid) -> Result<Option<Employee>, AppError> {
            Ok(None)
        }
        async fn upsert(&self, e: &Employee) -> Result<Employee, AppError> {
            Ok(e.clone())
        }
    }

    #[tokio::test]
    async fn repository_failure_is_a_fault_without_log() {
        let fixture = Fixture::active().await;
        let service = AccessService::new(
            fixture.subscriptions.clone(),
            fixture.employees.clone(),
            Arc::new(BrokenMembers),
            fixture.access_log.clone(),
            Arc::new(FixedClock(Utc::now())),
            brasilia(),
        );

        let result = service
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), deadline())
            .await;
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
        assert!(fixture.access_log.entries().await.is_empty());
    }

    #[tokio::test]
    async fn stalled_repository_hits_the_deadline() {
        let fixture = Fixture::active().await;
        let service = AccessService::new(
            fixture.subscriptions.clone(),
            Arc::new(StalledEmployees),
            fixture.members.clone(),
            fixture.access_log.clone(),
            Arc::new(FixedClock(Utc::now())),
            brasilia(),
        );

        let short = Instant::now() + std::time::Duration::from_millis(20);
        let result = service
            .validate_access(fixture.tenant_id, AccessPayload::pin("1234"), short)
            .await;
        assert!(matches!(result, Err(AppError::Timeout)));
        assert!(fixture.access_log.entries().await.is_empty());
    }
}
