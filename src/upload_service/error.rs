use std::{fmt::Display, path::PathBuf};

use crate::drive_store::error::Error as StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotADirectory(PathBuf),
    IOError(std::io::Error),
    StoreError(StoreError),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            Error::IOError(e) => write!(f, "could not read local directory: {}", e),
            Error::StoreError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            Error::StoreError(e) => Some(e),
            Error::NotADirectory(_) => None,
        }
    }
}

impl From<tokio::io::Error> for Error {
    fn from(value: tokio::io::Error) -> Self {
        Error::IOError(value)
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error::StoreError(value)
    }
}
