use crate::auth::{AuthPolicy, DefaultAuthPolicy};
use crate::config::ResolverConfig;
use crate::credentials::{normalize_registry_address, AnonymousStore, CredentialStore, Credentials};
use crate::error::{DigestError, Error, Result};
use crate::fallback::{AlwaysFallback, FallbackPredicate};
use crate::manifest::{fetch_digest, ManifestTarget, MediaTypes};
use crate::reference::ImageReference;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves image references to manifest digests
///
/// A lookup runs the whole protocol with modern media types, and when that
/// fails (and the fallback predicate agrees) runs it again from scratch with
/// the legacy media type. The second attempt's error is the one reported.
pub struct DigestResolver {
    config: ResolverConfig,
    credentials: Arc<dyn CredentialStore>,
    auth_policy: Arc<dyn AuthPolicy>,
    fallback: Arc<dyn FallbackPredicate>,
}

impl DigestResolver {
    /// Create a resolver with anonymous access and default policies
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            credentials: Arc::new(AnonymousStore),
            auth_policy: Arc::new(DefaultAuthPolicy),
            fallback: Arc::new(AlwaysFallback),
        }
    }

    /// Set the credential store
    pub fn with_credentials(mut self, store: impl CredentialStore + 'static) -> Self {
        self.credentials = Arc::new(store);
        self
    }

    /// Set the host-to-auth-scheme policy
    pub fn with_auth_policy(mut self, policy: impl AuthPolicy + 'static) -> Self {
        self.auth_policy = Arc::new(policy);
        self
    }

    /// Set the legacy fallback predicate
    pub fn with_fallback(mut self, predicate: impl FallbackPredicate + 'static) -> Self {
        self.fallback = Arc::new(predicate);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve an image reference string like "alpine:3.19" to its digest
    pub async fn resolve(&self, name: &str) -> std::result::Result<String, DigestError> {
        self.resolve_reference(&ImageReference::parse(name)).await
    }

    /// Resolve a reference straight from [`ImageReference::parse`]
    ///
    /// Defaults and the registry-prefix strip are applied here, so pass the
    /// parsed reference, not a normalized one.
    pub async fn resolve_reference(
        &self,
        reference: &ImageReference,
    ) -> std::result::Result<String, DigestError> {
        let reference = reference.clone().normalize();
        let credentials = self.credentials_for(&reference.registry);

        debug!("Resolving digest for {}", reference);

        let primary = match self
            .attempt(&reference, &credentials, MediaTypes::Modern)
            .await
        {
            Ok(digest) => Ok(digest),
            Err(e) if self.fallback.should_fallback(&e) => {
                debug!(
                    "Manifest lookup for {} failed ({}), retrying with legacy media type",
                    reference, e
                );
                self.attempt(&reference, &credentials, MediaTypes::Legacy)
                    .await
            }
            Err(e) => Err(e),
        };

        match primary {
            Ok(digest) => {
                info!("Resolved {} to {}", reference, digest);
                Ok(digest)
            }
            Err(e) => Err(DigestError::new(reference.repository, reference.tag, e)),
        }
    }

    /// Resolve, giving up with [`Error::Cancelled`] once `cancel` completes
    ///
    /// Any in-flight request is dropped when cancellation wins.
    pub async fn resolve_until<C>(
        &self,
        name: &str,
        cancel: C,
    ) -> std::result::Result<String, DigestError>
    where
        C: Future<Output = ()>,
    {
        let parsed = ImageReference::parse(name);

        tokio::select! {
            biased;
            _ = cancel => {
                let reference = parsed.clone().normalize();
                debug!("Lookup of {} cancelled", reference);
                Err(DigestError::new(reference.repository, reference.tag, Error::Cancelled))
            }
            result = self.resolve_reference(&parsed) => result,
        }
    }

    /// Credentials for a registry host, anonymous when unknown
    fn credentials_for(&self, registry: &str) -> Credentials {
        self.credentials
            .lookup(&normalize_registry_address(registry))
            .unwrap_or_default()
    }

    /// One independent pass through the protocol with a fresh client
    async fn attempt(
        &self,
        reference: &ImageReference,
        credentials: &Credentials,
        media_types: MediaTypes,
    ) -> Result<String> {
        let client = self.config.build_client()?;
        let target = ManifestTarget {
            scheme: self.config.scheme,
            registry: &reference.registry,
            repository: &reference.repository,
            tag: &reference.tag,
        };

        fetch_digest(
            &client,
            &target,
            credentials,
            self.auth_policy.as_ref(),
            media_types,
        )
        .await
    }
}

impl Default for DigestResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentialStore;
    use crate::reference::DEFAULT_REGISTRY;

    #[test]
    fn test_credentials_for_uses_normalized_host() {
        let store = StaticCredentialStore::new()
            .with("docker.io", Credentials::new("hub", "secret"))
            .with("ghcr.io", Credentials::new("user", "tokenPW"));
        let resolver = DigestResolver::default().with_credentials(store);

        assert_eq!(
            resolver.credentials_for(DEFAULT_REGISTRY),
            Credentials::new("hub", "secret")
        );
        assert_eq!(
            resolver.credentials_for("ghcr.io"),
            Credentials::new("user", "tokenPW")
        );
        assert!(resolver.credentials_for("quay.io").is_anonymous());
    }

    #[tokio::test]
    async fn test_resolve_until_already_cancelled() {
        let resolver = DigestResolver::default();

        let err = resolver
            .resolve_until("alpine", std::future::ready(()))
            .await
            .unwrap_err();

        assert!(matches!(err.source, Error::Cancelled));
        assert_eq!(err.repository, "library/alpine");
        assert_eq!(err.tag, "latest");
    }
}
