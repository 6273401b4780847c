//! Mock registry helpers
//!
//! Sets up wiremock servers that speak just enough of the distribution API
//! for digest lookups: manifest endpoints and a token realm.

use imgdigest_registry::manifest::DOCKER_MANIFEST_V1_PRETTYJWS;
use imgdigest_registry::{DigestResolver, ResolverConfig, Scheme};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::constants::*;

/// Registry host of the mock server, e.g. "127.0.0.1:40123"
pub fn registry_host(server: &MockServer) -> String {
    server.address().to_string()
}

/// Reference to the test image on the mock server
pub fn image_name(server: &MockServer) -> String {
    format!("{}/{}:{}", registry_host(server), REPOSITORY, TAG)
}

/// Resolver talking plain HTTP with default policies
pub fn test_resolver() -> DigestResolver {
    DigestResolver::new(ResolverConfig::default().with_scheme(Scheme::Http))
}

/// `WWW-Authenticate` challenge pointing at the mock token endpoint
pub fn bearer_challenge(server: &MockServer) -> String {
    format!(
        r#"Bearer realm="{}{}",service="{}",scope="{}""#,
        server.uri(),
        TOKEN_PATH,
        SERVICE,
        SCOPE
    )
}

/// Manifest endpoint answering 200 with a digest header
pub async fn mock_manifest_with_digest(server: &MockServer, digest: &str) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MANIFEST_BODY)
                .insert_header("Docker-Content-Digest", digest),
        )
        .mount(server)
        .await;
}

/// Manifest endpoint answering 200 without a digest header
pub async fn mock_manifest_body_only(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Manifest endpoint answering with a bare status
pub async fn mock_manifest_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Manifest endpoint answering 200 only to the legacy media type
pub async fn mock_legacy_manifest(server: &MockServer, digest: &str) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .and(header("accept", DOCKER_MANIFEST_V1_PRETTYJWS))
        .respond_with(ResponseTemplate::new(200).insert_header("Docker-Content-Digest", digest))
        .mount(server)
        .await;
}

/// Manifest endpoint demanding a bearer token; serves the digest once presented
pub async fn mock_token_protected_manifest(server: &MockServer, token: &str, digest: &str) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).insert_header("Docker-Content-Digest", digest))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", bearer_challenge(server)),
        )
        .mount(server)
        .await;
}

/// Token endpoint issuing `token`
pub async fn mock_token_endpoint(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .and(query_param("service", SERVICE))
        .and(query_param("scope", SCOPE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": token })),
        )
        .mount(server)
        .await;
}

/// Token endpoint answering with a bare status and body
pub async fn mock_token_response(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Requests the server received for `request_path`, in arrival order
pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .collect()
}

/// All values of a header on a received request
pub fn header_values(request: &Request, name: &str) -> Vec<String> {
    request
        .headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
