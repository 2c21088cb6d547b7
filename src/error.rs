use thiserror::Error;

use crate::domain::utils::id::Dpid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse controller config JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid controller configuration: {0}")]
    ConfigError(String),

    #[error("Edge weight must be a positive integer, got {0}")]
    InvalidWeight(u64),

    #[error("Self loops are not allowed in the topology graph: {0}")]
    SelfLoop(String),

    #[error("Switch {0} has no live connection")]
    SwitchNotConnected(Dpid),

    #[error("Failed to send message to switch {dpid}: {reason}")]
    SendFailed { dpid: Dpid, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
