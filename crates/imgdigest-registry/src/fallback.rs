//! Predicates deciding whether a failed lookup is retried with legacy media types
//!
//! The default, [`AlwaysFallback`], retries after any failure, including
//! transport errors. [`NegotiationOnly`] limits the retry to failures where
//! the registry actually answered. Cancellation never triggers a retry.

use crate::error::{Error, ErrorKind};

/// Decides whether the legacy attempt runs after the primary one failed
///
/// # Example
///
/// ```rust
/// use imgdigest_registry::fallback::FallbackPredicate;
/// use imgdigest_registry::{Error, ErrorKind};
///
/// struct SkipNotFound;
///
/// impl FallbackPredicate for SkipNotFound {
///     fn should_fallback(&self, error: &Error) -> bool {
///         !error.is_not_found() && error.kind() != ErrorKind::Cancelled
///     }
/// }
/// ```
pub trait FallbackPredicate: Send + Sync {
    fn should_fallback(&self, error: &Error) -> bool;
}

/// Retry with legacy media types after any failure
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFallback;

impl FallbackPredicate for AlwaysFallback {
    fn should_fallback(&self, error: &Error) -> bool {
        error.kind() != ErrorKind::Cancelled
    }
}

/// Never retry; surface the primary attempt's error
#[derive(Debug, Clone, Copy)]
pub struct NeverFallback;

impl FallbackPredicate for NeverFallback {
    fn should_fallback(&self, _error: &Error) -> bool {
        false
    }
}

/// Retry only when the registry answered but the exchange failed
#[derive(Debug, Clone, Copy)]
pub struct NegotiationOnly;

impl FallbackPredicate for NegotiationOnly {
    fn should_fallback(&self, error: &Error) -> bool {
        matches!(
            error.kind(),
            ErrorKind::Registry
                | ErrorKind::BadCredentials
                | ErrorKind::TokenParse
                | ErrorKind::BodyRead
        )
    }
}

/// A predicate backed by a closure
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> FallbackPredicate for ClosurePredicate<F>
where
    F: Fn(&Error) -> bool + Send + Sync,
{
    fn should_fallback(&self, error: &Error) -> bool {
        error.kind() != ErrorKind::Cancelled && (self.predicate)(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn registry_error(status: StatusCode) -> Error {
        Error::Registry { status }
    }

    #[test]
    fn test_always_fallback() {
        assert!(AlwaysFallback.should_fallback(&registry_error(StatusCode::NOT_FOUND)));
        assert!(AlwaysFallback.should_fallback(&Error::request_build("bad host")));
        assert!(!AlwaysFallback.should_fallback(&Error::Cancelled));
    }

    #[test]
    fn test_never_fallback() {
        assert!(!NeverFallback.should_fallback(&registry_error(StatusCode::NOT_FOUND)));
    }

    #[test]
    fn test_negotiation_only() {
        assert!(NegotiationOnly.should_fallback(&registry_error(StatusCode::BAD_REQUEST)));
        assert!(NegotiationOnly.should_fallback(&Error::BadCredentials {
            status: StatusCode::UNAUTHORIZED
        }));
        assert!(!NegotiationOnly.should_fallback(&Error::request_build("bad host")));
        assert!(!NegotiationOnly.should_fallback(&Error::Cancelled));
    }

    #[test]
    fn test_closure_predicate() {
        let predicate = ClosurePredicate::new(|e: &Error| !e.is_not_found());

        assert!(!predicate.should_fallback(&registry_error(StatusCode::NOT_FOUND)));
        assert!(predicate.should_fallback(&registry_error(StatusCode::BAD_REQUEST)));
        assert!(!predicate.should_fallback(&Error::Cancelled));
    }
}
