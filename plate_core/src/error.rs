use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PlateError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("malformed payload: {0}")]
    Decode(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("timeout waiting for device")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
