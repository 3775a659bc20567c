use std::{collections::HashMap, net::Ipv4Addr};

use reqwest::Url;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
};

use super::error::*;

const SUCCESS_PAGE: &str = "<html><body>The authentication flow has completed. You may close this window.</body></html>";
const FAILURE_PAGE: &str = "<html><body>Authorization failed. Check the terminal for details.</body></html>";
const NOT_FOUND_PAGE: &str = "<html><body>Not found.</body></html>";

///
/// Local HTTP endpoint the browser is redirected to once consent is given
///
pub struct RedirectListener {
    listener: TcpListener,
}

impl RedirectListener {
    pub async fn bind() -> Result<Self> {
        Ok(Self { listener: TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await? })
    }

    pub fn redirect_uri(&self) -> Result<String> {
        Ok(format!("http://127.0.0.1:{}/", self.listener.local_addr()?.port()))
    }

    ///
    /// Serves requests until one carries an authorization `code` (or an `error`),
    /// and returns that code. Requests carrying neither are answered with a 404.
    ///
    pub async fn wait_for_code(self, expected_state: &str) -> Result<String> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).await?;
            let mut header = String::new();
            loop {
                header.clear();
                let read = reader.read_line(&mut header).await?;
                if read == 0 || header.trim().is_empty() { break; }
            }

            let outcome = parse_redirect(&request_line, expected_state);
            let (status, page) = match &outcome {
                Ok(Some(_)) => ("200 OK", SUCCESS_PAGE),
                Ok(None) => ("404 Not Found", NOT_FOUND_PAGE),
                Err(_) => ("400 Bad Request", FAILURE_PAGE),
            };

            let mut stream = reader.into_inner();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status, page.len(), page
            );
            stream.write_all(response.as_bytes()).await?;
            if let Err(e) = stream.shutdown().await {
                tracing::debug!(error = %e, "could not close redirect connection");
            }

            if let Some(code) = outcome? {
                return Ok(code);
            }
        }
    }
}

///
/// Pulls the authorization code out of a redirect's request line,
/// e.g. `GET /?state=..&code=.. HTTP/1.1`
///
pub fn parse_redirect(request_line: &str, expected_state: &str) -> Result<Option<String>> {
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", target)) else {
        return Ok(None);
    };
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        return Err(Error::ConsentDenied(error.clone()));
    }
    let Some(code) = params.get("code") else {
        return Ok(None);
    };
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(Error::StateMismatch);
    }
    Ok(Some(code.clone()))
}
