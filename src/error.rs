use crate::{
    clarity::ClarityError,
    gateway::OpKind,
};
use thiserror::Error;

/// Operation-boundary failures. Every variant is recoverable: mutating
/// failures leave local state untouched, and a query failure means "state
/// unknown, keep the previous snapshot" rather than "state is empty".
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("user rejected the wallet prompt")]
    UserRejected,
    #[error("transaction broadcast failed: {0}")]
    BroadcastFailed(String),
    #[error("read-only query failed: {0}")]
    QueryFailed(String),
    #[error("unexpected on-chain value shape: {0}")]
    DecodeAnomaly(String),
    #[error("a {0} call is already in flight")]
    OperationInFlight(OpKind),
}

impl From<ClarityError> for ClientError {
    fn from(err: ClarityError) -> Self {
        ClientError::DecodeAnomaly(err.to_string())
    }
}
