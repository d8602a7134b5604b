// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT das rotas administrativas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,        // Subject (ID do usuário administrador)
    pub tenant_id: Uuid,  // Academia à qual o token dá acesso
    pub exp: usize,       // Expiration time
    pub iat: usize,       // Issued At
}
