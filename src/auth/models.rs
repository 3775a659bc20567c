use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::*;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed rather than used
const EXPIRY_SKEW_SECS: i64 = 300;

fn default_auth_uri() -> String { DEFAULT_AUTH_URI.to_string() }
fn default_token_uri() -> String { DEFAULT_TOKEN_URI.to_string() }

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

///
/// OAuth client registration, as downloaded from the Google console
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ClientSecrets {
    pub async fn load(path: &Path) -> Result<Self> {
        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingClientSecrets(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&json).ok_or_else(|| Error::InvalidClientSecrets(path.to_path_buf()))
    }

    fn from_json(json: &str) -> Option<Self> {
        let file: ClientSecretFile = serde_json::from_str(json).ok()?;
        file.installed.or(file.web)
    }
}

#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

///
/// The cached session, laid out the way Google's client libraries write
/// `token.json` so either side can read the other's file
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    pub fn new(secrets: &ClientSecrets, scopes: &[&str]) -> Self {
        Self {
            token: None,
            refresh_token: None,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            expiry: None,
        }
    }

    ///
    /// The access token, if there is one that will not expire in the next few minutes.
    /// A token without an expiry is taken to be valid.
    ///
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref()?;
        match self.expiry {
            Some(expiry) if expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now => None,
            _ => Some(token),
        }
    }

    ///
    /// Takes in a token endpoint response. A response without a refresh
    /// token keeps the one already held.
    ///
    pub fn apply(&mut self, res: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(res.access_token);
        self.expiry = res.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = res.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = res.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}
