//! Credential storage.
//!
//! A namespaced key-value seam used by the OAuth web flow and by credential
//! resolution for inbound calls. The resilient client never touches it.
//!
//! # Keys
//! ```text
//! user:{id}:access_token
//! user:{id}:access_token_secret
//! oauth:{state}:request_token
//! oauth:{state}:request_token_secret
//! oauth:{state}:user_id
//! ```

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::oauth::CredentialPair;

pub use memory::MemoryTokenStore;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value`; it expires after `ttl` when one is given.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

pub mod keys {
    pub fn access_token(user_id: &str) -> String {
        format!("user:{}:access_token", user_id)
    }

    pub fn access_token_secret(user_id: &str) -> String {
        format!("user:{}:access_token_secret", user_id)
    }

    pub fn request_token(state: &str) -> String {
        format!("oauth:{}:request_token", state)
    }

    pub fn request_token_secret(state: &str) -> String {
        format!("oauth:{}:request_token_secret", state)
    }

    pub fn pending_user(state: &str) -> String {
        format!("oauth:{}:user_id", state)
    }
}

/// Stored access credential for `user_id`, if both halves are present.
pub async fn load_user_credentials(
    store: &dyn TokenStore,
    user_id: &str,
) -> Result<Option<CredentialPair>, StoreError> {
    let token = store.get(&keys::access_token(user_id)).await?;
    let secret = store.get(&keys::access_token_secret(user_id)).await?;
    Ok(match (token, secret) {
        (Some(token), Some(secret)) => Some(CredentialPair::new(token, secret)),
        _ => None,
    })
}

/// Persist an access credential for `user_id` with no expiry.
pub async fn save_user_credentials(
    store: &dyn TokenStore,
    user_id: &str,
    credentials: &CredentialPair,
) -> Result<(), StoreError> {
    store
        .put(&keys::access_token(user_id), credentials.token(), None)
        .await?;
    store
        .put(&keys::access_token_secret(user_id), credentials.token_secret(), None)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(keys::access_token("u1"), "user:u1:access_token");
        assert_eq!(keys::access_token_secret("u1"), "user:u1:access_token_secret");
        assert_eq!(keys::request_token("s"), "oauth:s:request_token");
        assert_eq!(keys::request_token_secret("s"), "oauth:s:request_token_secret");
        assert_eq!(keys::pending_user("s"), "oauth:s:user_id");
    }

    #[tokio::test]
    async fn test_user_credentials_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(load_user_credentials(&store, "u1").await.unwrap(), None);

        let pair = CredentialPair::new("tok", "sec");
        save_user_credentials(&store, "u1", &pair).await.unwrap();
        assert_eq!(load_user_credentials(&store, "u1").await.unwrap(), Some(pair));
        assert_eq!(load_user_credentials(&store, "u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_half_a_pair_is_absent() {
        let store = MemoryTokenStore::new();
        store.put(&keys::access_token("u1"), "tok", None).await.unwrap();
        assert_eq!(load_user_credentials(&store, "u1").await.unwrap(), None);
    }
}
