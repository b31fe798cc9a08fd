//! Credential value types.
//!
//! Both types are immutable once built and never print their secret half.

use std::sync::Arc;

/// The application's own `(key, secret)` pair, constant for the process lifetime.
#[derive(Clone)]
pub struct ConsumerSecret {
    inner: Arc<(String, String)>,
}

impl ConsumerSecret {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            inner: Arc::new((key.into(), secret.into())),
        }
    }

    pub fn key(&self) -> &str {
        &self.inner.0
    }

    pub(crate) fn secret(&self) -> &str {
        &self.inner.1
    }
}

impl std::fmt::Debug for ConsumerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerSecret")
            .field("key", &self.key())
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A `(token, tokenSecret)` pair for one authorized session, or a pending
/// request token during the three-legged exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    token: String,
    token_secret: String,
}

impl CredentialPair {
    pub fn new(token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let consumer = ConsumerSecret::new("app-key", "app-secret");
        let pair = CredentialPair::new("tok", "tok-secret");

        let rendered = format!("{:?} {:?}", consumer, pair);
        assert!(rendered.contains("app-key"));
        assert!(rendered.contains("tok"));
        assert!(!rendered.contains("app-secret"));
        assert!(!rendered.contains("tok-secret"));
    }

    #[test]
    fn test_consumer_clone_shares_storage() {
        let consumer = ConsumerSecret::new("k", "s");
        let copy = consumer.clone();
        assert!(Arc::ptr_eq(&consumer.inner, &copy.inner));
        assert_eq!(copy.secret(), "s");
    }
}
