use std::{fmt::Display, path::PathBuf};

use crate::{drive_store::error::Error as StoreError, upload_service::error::Error as UploadError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    MissingBasename(PathBuf),
    StoreError(StoreError),
    UploadError(UploadError),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingBasename(path) => write!(f, "cannot name a backup for `{}`: it has no UTF-8 base name", path.display()),
            Error::StoreError(e) => write!(f, "{}", e),
            Error::UploadError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingBasename(_) => None,
            Error::StoreError(e) => Some(e),
            Error::UploadError(e) => Some(e),
        }
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error::StoreError(value)
    }
}

impl From<UploadError> for Error {
    fn from(value: UploadError) -> Self {
        Error::UploadError(value)
    }
}
