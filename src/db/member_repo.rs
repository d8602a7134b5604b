// src/db/member_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::upsert_error, models::people::Member};

/// Diretório de alunos de uma academia. A catraca só lê daqui.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Member>, AppError>;

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Member>, AppError>;

    /// `RecordNotFound` quando o ID já pertence a outra academia;
    /// `PinConflict` quando o PIN já está em uso no mesmo diretório.
    async fn upsert(&self, member: &Member) -> Result<Member, AppError>;
}

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for MemberRepository {
    async fn find_by_pin(&self, tenant_id: Uuid, pin: &str) -> Result<Option<Member>, AppError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE tenant_id = $1 AND access_pin = $2",
        )
        .bind(tenant_id)
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Member>, AppError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn upsert(&self, member: &Member) -> Result<Member, AppError> {
        let saved = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (
                id, tenant_id, name, email, phone, plan_name, status,
                expires_on, access_pin, cpf, goals, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                plan_name = EXCLUDED.plan_name,
                status = EXCLUDED.status,
                expires_on = EXCLUDED.expires_on,
                access_pin = EXCLUDED.access_pin,
                cpf = EXCLUDED.cpf,
                goals = EXCLUDED.goals,
                notes = EXCLUDED.notes,
                updated_at = NOW()
            WHERE members.tenant_id = EXCLUDED.tenant_id
            RETURNING *
            "#,
        )
        .bind(member.id)
        .bind(member.tenant_id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.plan_name)
        .bind(member.status)
        .bind(member.expires_on)
        .bind(&member.access_pin)
        .bind(&member.cpf)
        .bind(&member.goals)
        .bind(&member.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(upsert_error)?;

        // O WHERE descarta a escrita quando o ID pertence a outra academia
        saved.ok_or(AppError::RecordNotFound)
    }
}
