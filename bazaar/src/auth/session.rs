use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use super::models::User;

/// In-process bearer-token sessions with a TTL. Sessions die with the
/// process; clients simply log in again.
pub struct SessionStore {
    sessions: Cache<String, User>,
}

impl SessionStore {
    pub fn new(max_sessions: u64, ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_live(ttl)
            .build();
        Self { sessions }
    }

    /// Issue a fresh opaque token for the user.
    pub async fn issue(&self, user: User) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user).await;
        token
    }

    /// Resolve a token back to its user, if the session is still live.
    pub async fn resolve(&self, token: &str) -> Option<User> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn user() -> User {
        User::new("ada".to_string(), "hash".to_string(), Role::Customer)
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let store = SessionStore::new(100, Duration::from_secs(3600));
        let token = store.issue(user()).await;

        let resolved = store.resolve(&token).await.unwrap();
        assert_eq!(resolved.username, "ada");
        assert!(store.resolve("not-a-token").await.is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_no_longer_resolves() {
        let store = SessionStore::new(100, Duration::from_secs(3600));
        let token = store.issue(user()).await;
        store.revoke(&token).await;
        assert!(store.resolve(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_no_longer_resolves() {
        let store = SessionStore::new(100, Duration::from_millis(10));
        let token = store.issue(user()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.resolve(&token).await.is_none());
    }
}
