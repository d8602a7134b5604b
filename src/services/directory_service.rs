// src/services/directory_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeDirectory, MemberDirectory},
    models::people::{Employee, Member, UpsertEmployeePayload, UpsertMemberPayload},
};

/// Manutenção administrativa dos diretórios (cadastro de PIN, status, vencimento).
#[derive(Clone)]
pub struct DirectoryService {
    employees: Arc<dyn EmployeeDirectory>,
    members: Arc<dyn MemberDirectory>,
}

impl DirectoryService {
    pub fn new(employees: Arc<dyn EmployeeDirectory>, members: Arc<dyn MemberDirectory>) -> Self {
        Self { employees, members }
    }

    pub async fn get_employee(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError> {
        self.employees.find_by_id(tenant_id, id).await
    }

    pub async fn save_employee(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpsertEmployeePayload,
    ) -> Result<Employee, AppError> {
        let now = Utc::now();
        let created_at = self
            .employees
            .find_by_id(tenant_id, id)
            .await?
            .map(|e| e.created_at)
            .unwrap_or(now);

        self.employees
            .upsert(&Employee {
                id,
                tenant_id,
                name: input.name,
                email: input.email,
                login: input.login,
                role: input.role,
                status: input.status,
                pin: input.pin,
                created_at,
                updated_at: now,
            })
            .await
    }

    pub async fn get_member(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Member>, AppError> {
        self.members.find_by_id(tenant_id, id).await
    }

    pub async fn save_member(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpsertMemberPayload,
    ) -> Result<Member, AppError> {
        let now = Utc::now();
        let created_at = self
            .members
            .find_by_id(tenant_id, id)
            .await?
            .map(|m| m.created_at)
            .unwrap_or(now);

        self.members
            .upsert(&Member {
                id,
                tenant_id,
                name: input.name,
                email: input.email,
                phone: input.phone,
                plan_name: input.plan_name,
                status: input.status,
                expires_on: input.expires_on,
                access_pin: input.access_pin,
                cpf: input.cpf,
                goals: input.goals,
                notes: input.notes,
                created_at,
                updated_at: now,
            })
            .await
    }
}
