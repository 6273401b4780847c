//! Resolve command: look up the manifest digest of an image tag

use crate::cli::{FallbackMode, ResolveArgs};
use crate::output;
use anyhow::{Context, Result};
use imgdigest_registry::{
    AlwaysFallback, Credentials, DigestResolver, DockerConfig, ErrorKind, ImageReference,
    NegotiationOnly, NeverFallback, ResolverConfig, Scheme, StaticCredentialStore,
};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Result of a lookup, shaped like the data source it replaces
#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    name: &'a str,
    sha256_digest: &'a str,
}

pub async fn run(args: ResolveArgs) -> Result<()> {
    let reference = ImageReference::parse_normalized(&args.name);
    let store = load_credentials(&args, &reference.registry)?;
    let resolver = build_resolver(&args).with_credentials(store);

    let result = resolver.resolve_until(&args.name, ctrl_c()).await;

    let digest = match result {
        Ok(digest) => digest,
        Err(e) => {
            if e.kind() == ErrorKind::BadCredentials {
                output::warning(&format!(
                    "Registry {} rejected the credentials; check --config-file or --username",
                    reference.registry
                ));
            }
            return Err(e).with_context(|| format!("Failed to resolve {}", args.name));
        }
    };

    if args.json {
        let out = ResolveOutput {
            name: &args.name,
            sha256_digest: &digest,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", digest);
    }

    Ok(())
}

/// Resolver configured from the command-line flags
fn build_resolver(args: &ResolveArgs) -> DigestResolver {
    let timeout = match args.timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let scheme = if args.plain_http {
        Scheme::Http
    } else {
        Scheme::Https
    };

    let config = ResolverConfig::default()
        .with_insecure_skip_verify(args.insecure_skip_verify)
        .with_timeout(timeout)
        .with_scheme(scheme);

    let resolver = DigestResolver::new(config);
    match args.fallback {
        FallbackMode::Always => resolver.with_fallback(AlwaysFallback),
        FallbackMode::Negotiation => resolver.with_fallback(NegotiationOnly),
        FallbackMode::Never => resolver.with_fallback(NeverFallback),
    }
}

/// Credentials from the docker config, with flag credentials layered on top
fn load_credentials(args: &ResolveArgs, registry: &str) -> Result<StaticCredentialStore> {
    let config = match &args.config_file {
        Some(path) => DockerConfig::load(path)
            .with_context(|| format!("Failed to load registry config {}", path.display()))?,
        None => DockerConfig::load_default()
            .context("Failed to load default docker config")?
            .unwrap_or_default(),
    };

    let mut store = config.into_store();
    debug!("Loaded credentials for {} registries", store.len());

    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        store.insert(registry, Credentials::new(username.clone(), password.clone()));
    }

    Ok(store)
}

/// Completes when the user presses Ctrl-C
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; never cancel
        std::future::pending::<()>().await;
    }
}
