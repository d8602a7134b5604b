// src/db/employee_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::upsert_error, models::people::Employee};

/// Diretório de funcionários de uma academia.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Employee>, AppError>;

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError>;

    /// `RecordNotFound` quando o ID já pertence a outra academia;
    /// `PinConflict` quando o PIN já está em uso no mesmo diretório.
    async fn upsert(&self, employee: &Employee) -> Result<Employee, AppError>;
}

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for EmployeeRepository {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE tenant_id = $1 AND pin = $2",
        )
        .bind(tenant_id)
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn upsert(&self, employee: &Employee) -> Result<Employee, AppError> {
        let saved = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (id, tenant_id, name, email, login, role, status, pin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                login = EXCLUDED.login,
                role = EXCLUDED.role,
                status = EXCLUDED.status,
                pin = EXCLUDED.pin,
                updated_at = NOW()
            WHERE employees.tenant_id = EXCLUDED.tenant_id
            RETURNING *
            "#,
        )
        .bind(employee.id)
        .bind(employee.tenant_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.login)
        .bind(employee.role)
        .bind(employee.status)
        .bind(&employee.pin)
        .fetch_optional(&self.pool)
        .await
        .map_err(upsert_error)?;

        // O WHERE descarta a escrita quando o ID pertence a outra academia
        saved.ok_or(AppError::RecordNotFound)
    }
}
