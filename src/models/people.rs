// src/models/people.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// ENUMS
// ---
// Os literais em português só existem na fronteira (JSON). Internamente
// trabalhamos com variantes fechadas.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employee_role", rename_all = "snake_case")]
pub enum EmployeeRole {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Gestor")]
    Manager,
    #[serde(rename = "Professor")]
    Instructor,
    #[serde(rename = "Recepção")]
    Reception,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employee_status", rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_status", rename_all = "snake_case")]
pub enum MemberStatus {
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
    #[serde(rename = "Atrasado")]
    Overdue,
}

impl MemberStatus {
    /// Rótulo exibido ao operador (e gravado no log de acesso).
    pub fn label(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Ativo",
            MemberStatus::Inactive => "Inativo",
            MemberStatus::Overdue => "Atrasado",
        }
    }
}

// ---
// 1. Employee (Funcionário)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Carla Souza")]
    pub name: String,

    #[schema(example = "carla@academia.com")]
    pub email: String,

    #[schema(example = "carla.souza")]
    pub login: String,

    pub role: EmployeeRole,
    pub status: EmployeeStatus,

    // O PIN nunca sai na API
    #[serde(skip_serializing)]
    pub pin: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

// ---
// 2. Member (Aluno)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "João Pereira")]
    pub name: String,

    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(example = "Mensal")]
    pub plan_name: Option<String>,

    pub status: MemberStatus,

    // Data de vencimento do plano (sem hora)
    #[schema(example = "2024-05-15")]
    pub expires_on: NaiveDate,

    #[serde(skip_serializing)]
    pub access_pin: Option<String>,

    pub cpf: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Vencido apenas quando `today` é estritamente posterior ao vencimento.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expires_on
    }
}

// ---
// Payloads administrativos
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertEmployeePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub login: String,

    pub role: EmployeeRole,
    pub status: EmployeeStatus,

    #[validate(length(min = 4, max = 6, message = "O PIN deve ter entre 4 e 6 caracteres."))]
    pub pin: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMemberPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub plan_name: Option<String>,
    pub status: MemberStatus,

    #[schema(example = "2024-05-15")]
    pub expires_on: NaiveDate,

    #[validate(length(min = 4, max = 6, message = "O PIN deve ter entre 4 e 6 caracteres."))]
    pub access_pin: Option<String>,

    pub cpf: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,
}
