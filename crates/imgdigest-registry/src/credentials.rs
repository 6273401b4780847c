//! Registry credentials
//!
//! Credentials are looked up by normalized registry address through the
//! [`CredentialStore`] capability. [`StaticCredentialStore`] holds them in
//! memory; [`DockerConfig`] fills one from a docker `config.json`.

use crate::error::{Error, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Address Docker Hub credentials are stored under
pub const DOCKER_HUB_ADDRESS: &str = "https://index.docker.io/v1/";

/// Username/password pair; both empty means anonymous
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Anonymous credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether these credentials should be sent at all
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of registry credentials keyed by normalized registry address
///
/// Keys must be produced by [`normalize_registry_address`] so the store and
/// the resolver agree on what a host is called.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, normalized_host: &str) -> Option<Credentials>;
}

/// Store with no credentials at all
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousStore;

impl CredentialStore for AnonymousStore {
    fn lookup(&self, _normalized_host: &str) -> Option<Credentials> {
        None
    }
}

/// In-memory credential store
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    entries: HashMap<String, Credentials>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add credentials for a registry; the address is normalized first
    pub fn insert(&mut self, registry: &str, credentials: Credentials) {
        self.entries
            .insert(normalize_registry_address(registry), credentials);
    }

    /// Builder-style [`StaticCredentialStore::insert`]
    pub fn with(mut self, registry: &str, credentials: Credentials) -> Self {
        self.insert(registry, credentials);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialStore for StaticCredentialStore {
    fn lookup(&self, normalized_host: &str) -> Option<Credentials> {
        self.entries.get(normalized_host).cloned()
    }
}

/// Normalize a registry address into a credential-store key
///
/// All Docker Hub aliases collapse to [`DOCKER_HUB_ADDRESS`]. Other hosts get
/// an `https://` scheme unless they already carry one.
pub fn normalize_registry_address(address: &str) -> String {
    match address {
        "docker.io"
        | "index.docker.io"
        | "registry-1.docker.io"
        | "registry.hub.docker.com"
        | "https://index.docker.io/v1/"
        | "https://registry-1.docker.io"
        | "https://registry.hub.docker.com" => DOCKER_HUB_ADDRESS.to_string(),
        a if a.starts_with("http://") || a.starts_with("https://") => {
            a.trim_end_matches('/').to_string()
        }
        a => format!("https://{}", a.trim_end_matches('/')),
    }
}

/// Docker config.json structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    /// Registry auths keyed by registry address
    #[serde(default)]
    pub auths: HashMap<String, DockerAuthEntry>,
}

/// Docker auth entry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerAuthEntry {
    /// Base64-encoded "username:password"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Identity token
    #[serde(rename = "identitytoken", skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
}

impl DockerConfig {
    /// Parse config content
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config from its default location, if present
    pub fn load_default() -> Result<Option<Self>> {
        let Some(path) = Self::default_path() else {
            return Ok(None);
        };

        if !path.exists() {
            debug!("No docker config at {}", path.display());
            return Ok(None);
        }

        Self::load(&path).map(Some)
    }

    /// `$DOCKER_CONFIG/config.json`, else `~/.docker/config.json`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        dirs::home_dir().map(|home| home.join(".docker").join("config.json"))
    }

    /// Build a credential store from every decodable entry
    pub fn into_store(self) -> StaticCredentialStore {
        let mut store = StaticCredentialStore::new();
        for (registry, entry) in self.auths {
            match decode_docker_auth(&entry) {
                Some(credentials) => store.insert(&registry, credentials),
                None => debug!("Skipping undecodable auth entry for {}", registry),
            }
        }
        store
    }
}

/// Decode a docker auth entry into credentials
fn decode_docker_auth(entry: &DockerAuthEntry) -> Option<Credentials> {
    if let (Some(username), Some(password)) = (&entry.username, &entry.password) {
        return Some(Credentials::new(username.clone(), password.clone()));
    }

    if let Some(auth) = &entry.auth {
        let decoded = base64::engine::general_purpose::STANDARD.decode(auth).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        return Some(Credentials::new(username, password));
    }

    entry
        .identity_token
        .as_ref()
        .map(|token| Credentials::new("<token>", token.clone()))
}
