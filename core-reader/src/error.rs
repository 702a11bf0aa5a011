use core_fetch::FetchError;
use core_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid state: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
