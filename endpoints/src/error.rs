use agora_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
