use std::fmt::Display;

use crate::http::StatusError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    HttpError(reqwest::Error),
    ApiError { status: u16, message: String },
    IOError(std::io::Error),
    SerializeError(serde_json::Error),
    EmptyArgument(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::HttpError(e) => write!(f, "request to drive failed: {}", e),
            Error::ApiError { status, message } => write!(f, "drive responded with {}: {}", status, message),
            Error::IOError(e) => write!(f, "could not read local file: {}", e),
            Error::SerializeError(e) => write!(f, "could not encode request metadata: {}", e),
            Error::EmptyArgument(arg) => write!(f, "`{}` must not be empty", arg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::HttpError(e) => Some(e),
            Error::IOError(e) => Some(e),
            Error::SerializeError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::HttpError(value)
    }
}

impl From<tokio::io::Error> for Error {
    fn from(value: tokio::io::Error) -> Self {
        Error::IOError(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::SerializeError(value)
    }
}

impl From<StatusError> for Error {
    fn from(value: StatusError) -> Self {
        Error::ApiError { status: value.status, message: value.message }
    }
}
