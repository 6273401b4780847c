//! Digest extraction from successful manifest responses

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

/// Header registries use to announce the manifest digest
pub const CONTENT_DIGEST_HEADER: &str = "Docker-Content-Digest";

/// `sha256:<lowercase hex>` of the given bytes
pub fn compute_digest(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

/// Digest announced by the registry, if any
///
/// The value is returned verbatim and not checked against the body.
pub fn header_digest(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_DIGEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read the digest of a 200 manifest response
///
/// Uses the content-digest header when present, else hashes the full body.
pub async fn digest_from_response(response: reqwest::Response) -> Result<String> {
    if let Some(digest) = header_digest(response.headers()) {
        debug!("Using {} header: {}", CONTENT_DIGEST_HEADER, digest);
        return Ok(digest);
    }

    let body = response.bytes().await.map_err(Error::BodyRead)?;
    trace!("Computing digest over {} manifest bytes", body.len());
    Ok(compute_digest(&body))
}
