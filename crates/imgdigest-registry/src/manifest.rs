//! Manifest request and status dispatch
//!
//! One call of [`fetch_digest`] is one attempt: the initial manifest request,
//! plus the bearer handshake when the registry challenges for it.

use crate::auth::{request_token, AuthChallenge, AuthPolicy};
use crate::config::Scheme;
use crate::credentials::Credentials;
use crate::digest::digest_from_response;
use crate::error::{Error, Result};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";
pub const OCI_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
pub const OCI_INDEX_V1: &str = "application/vnd.oci.image.index.v1+json";

/// Schema 1 signed manifest, for registries without v2 negotiation
pub const DOCKER_MANIFEST_V1_PRETTYJWS: &str =
    "application/vnd.docker.distribution.manifest.v1+prettyjws";

/// Which `Accept` set a manifest request advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypes {
    /// Docker v2 manifest and list, OCI manifest and index
    Modern,
    /// Schema 1 only
    Legacy,
}

impl MediaTypes {
    pub fn accept_values(self) -> &'static [&'static str] {
        match self {
            MediaTypes::Modern => &[
                DOCKER_MANIFEST_V2,
                DOCKER_MANIFEST_LIST_V2,
                OCI_MANIFEST_V1,
                OCI_INDEX_V1,
            ],
            MediaTypes::Legacy => &[DOCKER_MANIFEST_V1_PRETTYJWS],
        }
    }
}

/// Everything needed to ask one registry for one manifest
#[derive(Debug, Clone)]
pub struct ManifestTarget<'a> {
    pub scheme: Scheme,
    pub registry: &'a str,
    pub repository: &'a str,
    pub tag: &'a str,
}

impl ManifestTarget<'_> {
    /// `<scheme>://<host>/v2/<repository>/manifests/<tag>`
    pub fn url(&self) -> Result<Url> {
        let raw = format!(
            "{}://{}/v2/{}/manifests/{}",
            self.scheme, self.registry, self.repository, self.tag
        );
        Url::parse(&raw).map_err(|e| Error::request_build(format!("{}: {}", raw, e)))
    }
}

/// Build the initial manifest request
pub fn build_manifest_request(
    client: &reqwest::Client,
    target: &ManifestTarget<'_>,
    credentials: &Credentials,
    policy: &dyn AuthPolicy,
    media_types: MediaTypes,
) -> Result<reqwest::Request> {
    let mut request = client.get(target.url()?);

    for media_type in media_types.accept_values() {
        request = request.header(ACCEPT, HeaderValue::from_static(*media_type));
    }

    if !credentials.is_anonymous() {
        let scheme = policy.scheme_for(target.registry);
        trace!("Using {:?} auth for {}", scheme, target.registry);
        request = request.header(AUTHORIZATION, scheme.header_value(credentials)?);
    }

    request
        .build()
        .map_err(|e| Error::request_build(e.to_string()))
}

/// Run one attempt against the registry and return the manifest digest
pub async fn fetch_digest(
    client: &reqwest::Client,
    target: &ManifestTarget<'_>,
    credentials: &Credentials,
    policy: &dyn AuthPolicy,
    media_types: MediaTypes,
) -> Result<String> {
    let request = build_manifest_request(client, target, credentials, policy, media_types)?;
    // Body-less GET, so the clone always succeeds
    let retry = request.try_clone();

    debug!("Fetching manifest from: {}", request.url());
    let response = client.execute(request).await.map_err(Error::Network)?;
    let status = response.status();
    trace!("Manifest request returned {}", status);

    match status {
        StatusCode::OK => digest_from_response(response).await,
        StatusCode::UNAUTHORIZED => {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .filter(|value| AuthChallenge::is_bearer(value))
                .map(AuthChallenge::parse);

            match challenge {
                Some(challenge) => {
                    let retry = retry.ok_or_else(|| {
                        Error::request_build("manifest request cannot be retried")
                    })?;
                    complete_bearer_handshake(client, retry, &challenge, credentials).await
                }
                None => Err(Error::BadCredentials { status }),
            }
        }
        _ => Err(Error::Registry { status }),
    }
}

/// Exchange the challenge for a token and re-issue the manifest request
async fn complete_bearer_handshake(
    client: &reqwest::Client,
    mut request: reqwest::Request,
    challenge: &AuthChallenge,
    credentials: &Credentials,
) -> Result<String> {
    let token = request_token(client, challenge, credentials).await?;

    request
        .headers_mut()
        .insert(AUTHORIZATION, token.header_value()?);

    debug!("Retrying manifest request with bearer token");
    let response = client.execute(request).await.map_err(Error::Network)?;

    if response.status() != StatusCode::OK {
        return Err(Error::Registry {
            status: response.status(),
        });
    }

    digest_from_response(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthScheme, DefaultAuthPolicy};

    fn target<'a>(registry: &'a str, repository: &'a str, tag: &'a str) -> ManifestTarget<'a> {
        ManifestTarget {
            scheme: Scheme::Https,
            registry,
            repository,
            tag,
        }
    }

    fn header_values(request: &reqwest::Request, name: &str) -> Vec<String> {
        request
            .headers()
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_manifest_url() {
        let url = target("registry-1.docker.io", "library/alpine", "latest")
            .url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry-1.docker.io/v2/library/alpine/manifests/latest"
        );
    }

    #[test]
    fn test_manifest_url_rejects_bad_host() {
        let result = target("bad host", "foo", "latest").url();
        assert!(matches!(result, Err(Error::RequestBuild { .. })));
    }

    #[test]
    fn test_modern_accept_headers() {
        let client = reqwest::Client::new();
        let request = build_manifest_request(
            &client,
            &target("quay.io", "foo/bar", "1.0"),
            &Credentials::anonymous(),
            &DefaultAuthPolicy,
            MediaTypes::Modern,
        )
        .unwrap();

        assert_eq!(
            header_values(&request, "accept"),
            vec![
                DOCKER_MANIFEST_V2,
                DOCKER_MANIFEST_LIST_V2,
                OCI_MANIFEST_V1,
                OCI_INDEX_V1
            ]
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_legacy_accept_header_replaces_modern_set() {
        let client = reqwest::Client::new();
        let request = build_manifest_request(
            &client,
            &target("gcr.io", "foo/bar", "1.0"),
            &Credentials::anonymous(),
            &DefaultAuthPolicy,
            MediaTypes::Legacy,
        )
        .unwrap();

        assert_eq!(
            header_values(&request, "accept"),
            vec![DOCKER_MANIFEST_V1_PRETTYJWS]
        );
    }

    #[test]
    fn test_ghcr_sends_password_as_bearer() {
        let client = reqwest::Client::new();
        let request = build_manifest_request(
            &client,
            &target("ghcr.io", "foo/bar", "v1"),
            &Credentials::new("user", "tokenPW"),
            &DefaultAuthPolicy,
            MediaTypes::Modern,
        )
        .unwrap();

        assert_eq!(
            header_values(&request, "authorization"),
            vec!["Bearer dG9rZW5QVw=="]
        );
    }

    #[test]
    fn test_other_hosts_use_basic_auth() {
        let client = reqwest::Client::new();
        let request = build_manifest_request(
            &client,
            &target("myregistry.com", "foo/bar", "1.2"),
            &Credentials::new("user", "tokenPW"),
            &DefaultAuthPolicy,
            MediaTypes::Modern,
        )
        .unwrap();

        assert_eq!(
            header_values(&request, "authorization"),
            vec!["Basic dXNlcjp0b2tlblBX"]
        );
    }

    #[test]
    fn test_custom_policy_is_consulted() {
        let client = reqwest::Client::new();
        let policy = |_: &str| AuthScheme::BearerPassword;
        let request = build_manifest_request(
            &client,
            &target("myregistry.com", "foo/bar", "1.2"),
            &Credentials::new("user", "tokenPW"),
            &policy,
            MediaTypes::Modern,
        )
        .unwrap();

        assert_eq!(
            header_values(&request, "authorization"),
            vec!["Bearer dG9rZW5QVw=="]
        );
    }
}
