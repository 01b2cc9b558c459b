//! Caller identity verification boundary.
//!
//! Identity tokens are minted and validated by the account system, which
//! is external to this engine; only the verification seam is modeled here.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;

/// A verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The caller's user id.
    pub uid: String,
    /// The caller's email, when the identity provider knows it.
    pub email: Option<String>,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}

/// Verifies bearer identity tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns the identity behind `token`, or `None` when the token is
    /// invalid or verification fails.
    async fn verify(&self, token: &str) -> Option<Identity>;
}

/// Fixed token-to-identity mapping for tests and local runs.
#[derive(Debug, Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, Identity>,
}

impl StaticIdentityVerifier {
    /// Creates an empty verifier that rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as belonging to the given identity.
    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }

    /// Parses a `token:uid[:email]` list separated by `;`.
    ///
    /// Used by the binary to seed identities for local runs.
    pub fn from_spec(spec: &str) -> Self {
        let mut verifier = Self::new();
        for entry in spec.split(';').filter(|e| !e.trim().is_empty()) {
            let mut parts = entry.trim().splitn(3, ':');
            if let (Some(token), Some(uid)) = (parts.next(), parts.next()) {
                let email = parts.next().map(String::from);
                verifier = verifier.with_identity(token, Identity::new(uid, email));
            }
        }
        verifier
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Option<Identity> {
        self.identities.get(token).cloned()
    }
}

/// Extracts the bearer token from an Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn static_verifier_lookup() {
        let verifier = StaticIdentityVerifier::new().with_identity(
            "tok-1",
            Identity::new("u1", Some("ana@example.com".into())),
        );
        let identity = verifier.verify("tok-1").await.unwrap();
        assert_eq!(identity.uid, "u1");
        assert!(verifier.verify("tok-2").await.is_none());
    }

    #[tokio::test]
    async fn from_spec_parses_entries() {
        let verifier = StaticIdentityVerifier::from_spec("t1:u1:ana@example.com; t2:u2");
        assert_eq!(
            verifier.verify("t1").await,
            Some(Identity::new("u1", Some("ana@example.com".into())))
        );
        assert_eq!(verifier.verify("t2").await, Some(Identity::new("u2", None)));
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-1"),
        );
        assert_eq!(bearer_token(&headers), Some("tok-1"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcg=="),
        );
        assert!(bearer_token(&headers).is_none());
    }
}
