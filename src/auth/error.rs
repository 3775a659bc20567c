use std::{fmt::Display, path::PathBuf};

use crate::http::StatusError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    IOError(std::io::Error),
    ParseError(serde_json::Error),
    HttpError(reqwest::Error),
    MissingClientSecrets(PathBuf),
    InvalidClientSecrets(PathBuf),
    InvalidUrl(String),
    ConsentDenied(String),
    StateMismatch,
    TokenEndpointError { status: u16, message: String },
    MissingAccessToken,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IOError(e) => write!(f, "credential file error: {}", e),
            Error::ParseError(e) => write!(f, "malformed credential file: {}", e),
            Error::HttpError(e) => write!(f, "token request failed: {}", e),
            Error::MissingClientSecrets(path) => write!(f, "client secrets not found at {}", path.display()),
            Error::InvalidClientSecrets(path) => write!(f, "{} has neither an `installed` nor a `web` section", path.display()),
            Error::InvalidUrl(e) => write!(f, "invalid authorization url: {}", e),
            Error::ConsentDenied(reason) => write!(f, "authorization was not granted: {}", reason),
            Error::StateMismatch => write!(f, "authorization response did not match the request"),
            Error::TokenEndpointError { status, message } => write!(f, "token endpoint responded with {}: {}", status, message),
            Error::MissingAccessToken => write!(f, "no access token was issued"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            Error::ParseError(e) => Some(e),
            Error::HttpError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio::io::Error> for Error {
    fn from(value: tokio::io::Error) -> Self {
        Error::IOError(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::ParseError(value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::HttpError(value)
    }
}

impl From<StatusError> for Error {
    fn from(value: StatusError) -> Self {
        Error::TokenEndpointError { status: value.status, message: value.message }
    }
}
