//! Registry Authentication
//!
//! Implements the registry token handshake:
//! 1. Manifest request returns 401 with a `WWW-Authenticate: Bearer ...` header
//! 2. Parse realm, service, and scope from the header
//! 3. Request a token from the realm
//! 4. Retry the manifest request with that token
//!
//! Tokens are used for exactly one retried request and never cached.

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use base64::Engine;
use reqwest::header::HeaderValue;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Host whose "password" is a pre-issued token
pub const GITHUB_CONTAINER_REGISTRY: &str = "ghcr.io";

/// How credentials are presented on the initial manifest request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Basic base64(user:pass)`
    Basic,
    /// `Authorization: Bearer base64(pass)`
    BearerPassword,
}

impl AuthScheme {
    /// Render the `Authorization` header value for non-anonymous credentials
    pub fn header_value(self, credentials: &Credentials) -> Result<HeaderValue> {
        let engine = &base64::engine::general_purpose::STANDARD;
        let value = match self {
            AuthScheme::Basic => format!(
                "Basic {}",
                engine.encode(format!("{}:{}", credentials.username, credentials.password))
            ),
            AuthScheme::BearerPassword => {
                format!("Bearer {}", engine.encode(&credentials.password))
            }
        };

        let mut header = HeaderValue::from_str(&value)
            .map_err(|e| Error::request_build(format!("invalid authorization header: {}", e)))?;
        header.set_sensitive(true);
        Ok(header)
    }
}

/// Chooses the [`AuthScheme`] for a registry host
///
/// Registry-specific quirks live here rather than in the request logic.
/// Any `Fn(&str) -> AuthScheme` closure is a policy.
pub trait AuthPolicy: Send + Sync {
    fn scheme_for(&self, host: &str) -> AuthScheme;
}

/// Basic auth everywhere except GHCR, which takes its token as a bearer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAuthPolicy;

impl AuthPolicy for DefaultAuthPolicy {
    fn scheme_for(&self, host: &str) -> AuthScheme {
        if host == GITHUB_CONTAINER_REGISTRY {
            AuthScheme::BearerPassword
        } else {
            AuthScheme::Basic
        }
    }
}

impl<F> AuthPolicy for F
where
    F: Fn(&str) -> AuthScheme + Send + Sync,
{
    fn scheme_for(&self, host: &str) -> AuthScheme {
        self(host)
    }
}

/// Parameters of a `WWW-Authenticate` challenge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthChallenge {
    params: HashMap<String, String>,
}

impl AuthChallenge {
    /// Parse a challenge like `Bearer realm="...",service="...",scope="..."`
    ///
    /// Missing keys are simply absent; pairs without `=` are skipped.
    pub fn parse(header: &str) -> Self {
        let rest = header
            .trim_start()
            .split_once(' ')
            .map(|(_, rest)| rest)
            .unwrap_or("");

        let params = rest
            .split(',')
            .filter_map(|part| part.split_once('='))
            .map(|(key, value)| {
                (
                    key.trim().to_string(),
                    value.trim_matches(|c| c == '"' || c == ' ').to_string(),
                )
            })
            .collect();

        Self { params }
    }

    /// Whether a header value announces a bearer challenge
    pub fn is_bearer(header: &str) -> bool {
        header.starts_with("Bearer")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn realm(&self) -> Option<&str> {
        self.get("realm")
    }

    pub fn service(&self) -> Option<&str> {
        self.get("service")
    }

    pub fn scope(&self) -> Option<&str> {
        self.get("scope")
    }

    /// Token endpoint URL: `<realm>?service=<service>&scope=<scope>`
    pub fn token_url(&self) -> Result<Url> {
        let realm = self
            .realm()
            .ok_or_else(|| Error::request_build("missing realm in WWW-Authenticate"))?;

        let mut url = Url::parse(realm)
            .map_err(|e| Error::request_build(format!("invalid token realm {}: {}", realm, e)))?;
        url.query_pairs_mut()
            .append_pair("service", self.service().unwrap_or(""))
            .append_pair("scope", self.scope().unwrap_or(""));

        Ok(url)
    }
}

/// Token issued by the authorization server
#[derive(Debug, Clone, Deserialize)]
pub struct BearerToken {
    pub token: String,
}

impl BearerToken {
    /// Decode a token endpoint response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(Error::TokenParse)
    }

    /// `Authorization: Bearer <token>`
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| Error::request_build(format!("invalid bearer token: {}", e)))?;
        header.set_sensitive(true);
        Ok(header)
    }
}

/// Fetch a token for the given challenge
pub async fn request_token(
    client: &reqwest::Client,
    challenge: &AuthChallenge,
    credentials: &Credentials,
) -> Result<BearerToken> {
    let url = challenge.token_url()?;

    debug!(
        "Requesting token from {} (service={}, scope={})",
        challenge.realm().unwrap_or_default(),
        challenge.service().unwrap_or_default(),
        challenge.scope().unwrap_or_default()
    );

    let mut request = client.get(url);
    if !credentials.is_anonymous() {
        request = request.basic_auth(&credentials.username, Some(&credentials.password));
    }

    let response = request.send().await.map_err(Error::Network)?;

    if response.status() != StatusCode::OK {
        return Err(Error::Registry {
            status: response.status(),
        });
    }

    let body = response.bytes().await.map_err(Error::BodyRead)?;
    BearerToken::from_slice(&body)
}
