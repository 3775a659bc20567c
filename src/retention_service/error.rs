use std::fmt::Display;

use crate::{backup_name::MalformedName, drive_store::error::Error as StoreError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    StoreError(StoreError),
    MalformedName(MalformedName),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::StoreError(e) => write!(f, "{}", e),
            Error::MalformedName(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::StoreError(e) => Some(e),
            Error::MalformedName(e) => Some(e),
        }
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error::StoreError(value)
    }
}

impl From<MalformedName> for Error {
    fn from(value: MalformedName) -> Self {
        Error::MalformedName(value)
    }
}
