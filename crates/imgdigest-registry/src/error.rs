//! Error types for imgdigest-registry

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using imgdigest-registry's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single digest lookup attempt
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed registry URL, realm, or header value
    #[error("Error creating registry request: {message}")]
    RequestBuild { message: String },

    /// Transport failure (DNS, TLS, connection reset, timeout)
    #[error("Error during registry request: {0}")]
    Network(#[source] reqwest::Error),

    /// 401 without a bearer challenge
    #[error("Bad credentials: {status}")]
    BadCredentials { status: StatusCode },

    /// Unexpected status from the manifest or token endpoint
    #[error("Got bad response from registry: {status}")]
    Registry { status: StatusCode },

    /// Token endpoint answered with something other than `{"token": ...}`
    #[error("Error parsing OAuth token response: {0}")]
    TokenParse(#[source] serde_json::Error),

    /// Reading a response body failed
    #[error("Error reading registry response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The caller cancelled the lookup
    #[error("Registry request cancelled")]
    Cancelled,

    /// Credential file could not be read
    #[error("Failed to read registry config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential file is not valid docker config JSON
    #[error("Failed to parse registry config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of [`Error`], used by fallback predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RequestBuild,
    Network,
    BadCredentials,
    Registry,
    TokenParse,
    BodyRead,
    Cancelled,
    Config,
}

impl Error {
    /// Create a request build error
    pub fn request_build(message: impl Into<String>) -> Self {
        Self::RequestBuild {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestBuild { .. } => ErrorKind::RequestBuild,
            Self::Network(_) => ErrorKind::Network,
            Self::BadCredentials { .. } => ErrorKind::BadCredentials,
            Self::Registry { .. } => ErrorKind::Registry,
            Self::TokenParse(_) => ErrorKind::TokenParse,
            Self::BodyRead(_) => ErrorKind::BodyRead,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status carried by the error, if the registry answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadCredentials { status } | Self::Registry { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether the registry reported the manifest as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Final error of a digest lookup, after any fallback attempt
#[derive(Error, Debug)]
#[error("failed to fetch image version {repository}:{tag} from registry: {source}")]
pub struct DigestError {
    /// Normalized repository path
    pub repository: String,
    /// Normalized tag
    pub tag: String,
    /// Error of the last attempt made
    #[source]
    pub source: Error,
}

impl DigestError {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>, source: Error) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
            source,
        }
    }

    /// Kind of the underlying failure
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
