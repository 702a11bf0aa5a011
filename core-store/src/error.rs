use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
