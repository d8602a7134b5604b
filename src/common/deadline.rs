use std::future::Future;

use tokio::time::Instant;

use crate::common::error::AppError;

/// Executa uma chamada ao repositório respeitando o prazo da requisição.
/// Prazo estourado vira `AppError::Timeout` em vez de travar a catraca.
pub async fn within<T, F>(deadline: Instant, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout_at(deadline, fut)
        .await
        .map_err(|_| AppError::Timeout)?
}
