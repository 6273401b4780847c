//! Shared test data

pub const REPOSITORY: &str = "foo/bar";
pub const TAG: &str = "v1";
pub const MANIFEST_PATH: &str = "/v2/foo/bar/manifests/v1";
pub const TOKEN_PATH: &str = "/token";

pub const SERVICE: &str = "registry.test";
pub const SCOPE: &str = "repository:foo/bar:pull";
pub const TOKEN: &str = "registry-issued-token";

pub const HEADER_DIGEST: &str =
    "sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b";

pub const MANIFEST_BODY: &str = r#"{"schemaVersion":2,"mediaType":"application/vnd.oci.image.manifest.v1+json","config":{"mediaType":"application/vnd.oci.image.config.v1+json","size":7023,"digest":"sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7"},"layers":[]}"#;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "pass";
/// base64("user:pass")
pub const BASIC_AUTH: &str = "Basic dXNlcjpwYXNz";
