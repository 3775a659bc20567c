pub mod error;
pub mod loopback;
pub mod models;
pub mod pkce;

use std::path::Path;

use reqwest::{Client, Url};

use error::*;
use loopback::RedirectListener;
use models::{ClientSecrets, StoredCredentials, TokenResponse};
use pkce::{random_token, Pkce};

use crate::{http::check_status, time_provider::TimeProvider};

pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const STATE_LEN: usize = 32;

///
/// Obtains an access token for the installed-application OAuth flow,
/// keeping the session in a local credential cache between runs.
///
pub struct Authenticator<'a> {
    client: Client,
    client_secret_path: &'a Path,
    token_path: &'a Path,
    scopes: &'a [&'a str],
    time_provider: &'a dyn TimeProvider,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        client: Client,
        client_secret_path: &'a Path,
        token_path: &'a Path,
        scopes: &'a [&'a str],
        time_provider: &'a dyn TimeProvider,
    ) -> Self {
        Self { client, client_secret_path, token_path, scopes, time_provider }
    }

    ///
    /// Returns a usable access token. Uses the cached one while it is fresh,
    /// refreshes it when a refresh token is held, and otherwise asks the user
    /// for consent in the browser. The cache is rewritten after the latter two.
    ///
    pub async fn authenticate(&self) -> Result<String> {
        let credentials = match self.load_cached().await? {
            Some(cached) => {
                if let Some(token) = cached.valid_token(self.time_provider.utc_now()) {
                    tracing::debug!("using cached access token");
                    return Ok(token.to_string());
                }
                match cached.refresh_token.clone() {
                    Some(refresh_token) => self.refresh(cached, &refresh_token).await?,
                    None => self.consent().await?,
                }
            }
            None => self.consent().await?,
        };

        self.store(&credentials).await?;
        credentials.token.ok_or(Error::MissingAccessToken)
    }

    async fn load_cached(&self) -> Result<Option<StoredCredentials>> {
        match tokio::fs::read_to_string(self.token_path).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, credentials: &StoredCredentials) -> Result<()> {
        tokio::fs::write(self.token_path, serde_json::to_string_pretty(credentials)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(self.token_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tracing::debug!(path = %self.token_path.display(), "saved credentials");
        Ok(())
    }

    async fn refresh(&self, mut credentials: StoredCredentials, refresh_token: &str) -> Result<StoredCredentials> {
        tracing::info!("refreshing access token");
        let res = self.client.post(&credentials.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send().await?;

        let token: TokenResponse = check_status(res).await?.json().await?;
        credentials.apply(token, self.time_provider.utc_now());
        Ok(credentials)
    }

    async fn consent(&self) -> Result<StoredCredentials> {
        let secrets = ClientSecrets::load(self.client_secret_path).await?;
        let listener = RedirectListener::bind().await?;
        let redirect_uri = listener.redirect_uri()?;
        let pkce = Pkce::generate();
        let state = random_token(STATE_LEN);

        let url = authorization_url(&secrets, &redirect_uri, self.scopes, &state, &pkce.challenge)?;
        println!("Please visit this URL to authorize this application: {}", url);

        let code = listener.wait_for_code(&state).await?;
        tracing::debug!("received authorization code");

        let res = self.client.post(&secrets.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("code_verifier", pkce.verifier.as_str()),
            ])
            .send().await?;

        let token: TokenResponse = check_status(res).await?.json().await?;
        let mut credentials = StoredCredentials::new(&secrets, self.scopes);
        credentials.apply(token, self.time_provider.utc_now());
        if credentials.refresh_token.is_none() {
            tracing::warn!("no refresh token was issued; consent will be asked again once the token expires");
        }
        Ok(credentials)
    }
}

///
/// The consent page URL for an authorization-code request with PKCE
///
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
    code_challenge: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(&secrets.auth_uri, &[
        ("response_type", "code"),
        ("client_id", secrets.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("scope", scope.as_str()),
        ("state", state),
        ("code_challenge", code_challenge),
        ("code_challenge_method", "S256"),
        ("access_type", "offline"),
        ("prompt", "consent"),
    ]).map_err(|e| Error::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, TimeZone, Utc};

    use crate::{
        http::test_server::{client, serve},
        time_provider::MockTimeProvider,
    };

    use super::{
        error::Error,
        models::{ClientSecrets, StoredCredentials},
        *,
    };

    fn build_mock_time_provider() -> MockTimeProvider {
        let mut mock_tp = MockTimeProvider::new();
        mock_tp.expect_utc_now()
            .returning(|| Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap());
        mock_tp
    }

    fn cached(refresh_token: Option<&str>, expires_in: Duration) -> StoredCredentials {
        StoredCredentials {
            token: Some("cached-token".into()),
            refresh_token: refresh_token.map(str::to_string),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            scopes: vec![DRIVE_FILE_SCOPE.into()],
            expiry: Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() + expires_in),
        }
    }

    #[tokio::test]
    async fn test_fresh_cached_token_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let secrets_path = dir.path().join("client_secret.json");
        let json = serde_json::to_string(&cached(Some("refresh"), Duration::hours(1))).unwrap();
        std::fs::write(&token_path, &json).unwrap();

        let time_provider = build_mock_time_provider();
        let scopes = [DRIVE_FILE_SCOPE];
        let auth = Authenticator::new(Client::new(), &secrets_path, &token_path, &scopes, &time_provider);

        assert_eq!(auth.authenticate().await.unwrap(), "cached-token");
        assert_eq!(std::fs::read_to_string(&token_path).unwrap(), json);
    }

    #[tokio::test]
    async fn test_expiring_token_without_refresh_asks_for_consent() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let secrets_path = dir.path().join("client_secret.json");
        let json = serde_json::to_string(&cached(None, Duration::minutes(1))).unwrap();
        std::fs::write(&token_path, json).unwrap();

        let time_provider = build_mock_time_provider();
        let scopes = [DRIVE_FILE_SCOPE];
        let auth = Authenticator::new(Client::new(), &secrets_path, &token_path, &scopes, &time_provider);

        // consent needs client secrets, which were never written
        assert!(matches!(auth.authenticate().await, Err(Error::MissingClientSecrets(_))));
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_and_cached() {
        let server = serve(vec![(200, r#"{"access_token": "fresh-token", "expires_in": 3599, "token_type": "Bearer"}"#)]).await;
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let secrets_path = dir.path().join("client_secret.json");
        let mut credentials = cached(Some("refresh"), Duration::minutes(1));
        credentials.token_uri = format!("{}/token", server.base_url);
        std::fs::write(&token_path, serde_json::to_string(&credentials).unwrap()).unwrap();

        let time_provider = build_mock_time_provider();
        let scopes = [DRIVE_FILE_SCOPE];
        let auth = Authenticator::new(client(), &secrets_path, &token_path, &scopes, &time_provider);

        assert_eq!(auth.authenticate().await.unwrap(), "fresh-token");

        let requests = server.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.starts_with("POST /token "));
        assert!(requests[0].1.contains("grant_type=refresh_token"));
        assert!(requests[0].1.contains("refresh_token=refresh"));

        let saved: StoredCredentials = serde_json::from_str(&std::fs::read_to_string(&token_path).unwrap()).unwrap();
        assert_eq!(saved.token.as_deref(), Some("fresh-token"));
        assert_eq!(saved.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(
            saved.expiry,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() + Duration::seconds(3599))
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&token_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_rejected_refresh_leaves_cache_untouched() {
        let server = serve(vec![(400, r#"{"error": "invalid_grant"}"#)]).await;
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let secrets_path = dir.path().join("client_secret.json");
        let mut credentials = cached(Some("revoked"), Duration::minutes(1));
        credentials.token_uri = format!("{}/token", server.base_url);
        let json = serde_json::to_string(&credentials).unwrap();
        std::fs::write(&token_path, &json).unwrap();

        let time_provider = build_mock_time_provider();
        let scopes = [DRIVE_FILE_SCOPE];
        let auth = Authenticator::new(client(), &secrets_path, &token_path, &scopes, &time_provider);

        match auth.authenticate().await {
            Err(Error::TokenEndpointError { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid_grant"));
            }
            other => panic!("expected a token endpoint error, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&token_path).unwrap(), json);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, "not json").unwrap();

        let time_provider = build_mock_time_provider();
        let scopes = [DRIVE_FILE_SCOPE];
        let secrets_path = dir.path().join("client_secret.json");
        let auth = Authenticator::new(Client::new(), &secrets_path, &token_path, &scopes, &time_provider);

        assert!(matches!(auth.authenticate().await, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_authorization_url_carries_pkce_and_offline_access() {
        let secrets = ClientSecrets {
            client_id: "client".into(),
            client_secret: "secret".into(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
        };
        let url = authorization_url(&secrets, "http://127.0.0.1:8080/", &[DRIVE_FILE_SCOPE], "st", "ch").unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(params["scope"], DRIVE_FILE_SCOPE);
        assert_eq!(params["state"], "st");
        assert_eq!(params["code_challenge"], "ch");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["response_type"], "code");
    }
}
