use pdt_core::{ProtocolError, RpcError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("page context is gone")]
    PageClosed,
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl RelayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RelayError::Rpc(RpcError::Timeout { .. }))
    }
}
