use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaqError {
    #[error("connect to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },
    #[error("daq session closed by peer")]
    SessionClosed,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DaqError>;
