//! Registry protocol client for imgdigest
//!
//! This crate resolves the current manifest digest of a tagged image:
//! - Parsing and normalizing image references (Docker Hub defaults included)
//! - Negotiating manifest media types, with a legacy fallback attempt
//! - Basic auth, GHCR-style bearer passwords, and the registry token handshake
//! - Reading `Docker-Content-Digest` or hashing the manifest body
//! - Loading credentials from a docker `config.json`
//!
//! # Example
//!
//! ```no_run
//! use imgdigest_registry::{DigestResolver, DockerConfig, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = DockerConfig::load_default()?.unwrap_or_default().into_store();
//!     let resolver = DigestResolver::new(ResolverConfig::default()).with_credentials(store);
//!
//!     let digest = resolver.resolve("alpine:3.19").await?;
//!     println!("{}", digest);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod credentials;
pub mod digest;
pub mod error;
pub mod fallback;
pub mod manifest;
pub mod reference;
pub mod resolver;

// Re-export main types for convenience
pub use auth::{AuthChallenge, AuthPolicy, AuthScheme, BearerToken, DefaultAuthPolicy};
pub use config::{ResolverConfig, Scheme};
pub use credentials::{
    normalize_registry_address, AnonymousStore, CredentialStore, Credentials, DockerConfig,
    StaticCredentialStore,
};
pub use digest::{compute_digest, CONTENT_DIGEST_HEADER};
pub use error::{DigestError, Error, ErrorKind, Result};
pub use fallback::{
    AlwaysFallback, ClosurePredicate, FallbackPredicate, NegotiationOnly, NeverFallback,
};
pub use manifest::MediaTypes;
pub use reference::{ImageReference, DEFAULT_REGISTRY, DEFAULT_TAG};
pub use resolver::DigestResolver;

/// Version of the imgdigest-registry crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
