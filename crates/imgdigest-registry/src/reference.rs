use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry used when a reference names no host
pub const DEFAULT_REGISTRY: &str = "registry-1.docker.io";

/// Tag used when a reference names no tag
pub const DEFAULT_TAG: &str = "latest";

/// Namespace Docker Hub applies to single-segment official images
const OFFICIAL_NAMESPACE: &str = "library/";

/// Container image reference split into registry, repository, and tag
///
/// `registry` and `tag` are empty straight out of [`ImageReference::parse`]
/// when the input did not name them; [`ImageReference::normalize`] fills in
/// the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry hostname, optionally with port (e.g., "ghcr.io", "localhost:5000")
    pub registry: String,
    /// Repository path (e.g., "library/alpine")
    pub repository: String,
    /// Tag (e.g., "3.19")
    pub tag: String,
}

impl ImageReference {
    /// Parse a reference string like "ghcr.io/foo/bar:v1"
    ///
    /// Never fails: anything unusual degrades to a best-effort split, the way
    /// registries themselves treat references.
    pub fn parse(s: &str) -> Self {
        // A tag colon must come after the last slash, otherwise it is a port
        let name_start = s.rfind('/').map(|idx| idx + 1).unwrap_or(0);
        let (remainder, tag) = match s[name_start..].find(':') {
            Some(idx) => {
                let colon = name_start + idx;
                (&s[..colon], &s[colon + 1..])
            }
            None => (s, ""),
        };

        let (registry, repository) = match remainder.split_once('/') {
            Some((first, rest)) if looks_like_host(first) => (first, rest),
            _ => ("", remainder),
        };

        Self {
            registry: registry.to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Apply registry, namespace, and tag defaults
    pub fn normalize(mut self) -> Self {
        if self.registry.is_empty() {
            self.registry = DEFAULT_REGISTRY.to_string();
        } else if let Some(stripped) = self
            .repository
            .strip_prefix(&format!("{}/", self.registry))
        {
            self.repository = stripped.to_string();
        }

        if self.registry == DEFAULT_REGISTRY && !self.repository.contains('/') {
            self.repository = format!("{}{}", OFFICIAL_NAMESPACE, self.repository);
        }

        if self.tag.is_empty() {
            self.tag = DEFAULT_TAG.to_string();
        }

        self
    }

    /// Parse and normalize in one step
    pub fn parse_normalized(s: &str) -> Self {
        Self::parse(s).normalize()
    }
}

/// Hostnames carry a dot or a port
fn looks_like_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':')
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.registry.is_empty() {
            write!(f, "{}/", self.registry)?;
        }
        write!(f, "{}", self.repository)?;
        if !self.tag.is_empty() {
            write!(f, ":{}", self.tag)?;
        }
        Ok(())
    }
}
