//! The user directory - a flat, read-only author cache.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{User, UserId};
use crate::error::StoreError;
use crate::ports::UserService;

/// Flat cache of the remote user list. `load()` replaces the whole list;
/// there are no mutation operations and no recovery beyond surfacing the
/// fetch error to the caller.
pub struct UserDirectory {
    remote: Arc<dyn UserService>,
    users: RwLock<Arc<Vec<User>>>,
}

impl UserDirectory {
    pub fn new(remote: Arc<dyn UserService>) -> Self {
        Self {
            remote,
            users: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Replace the cached list with the remote one.
    pub async fn load(&self) -> Result<(), StoreError> {
        let users = self.remote.fetch_users().await?;
        tracing::debug!(users = users.len(), "user directory loaded");
        *self.users.write().await = Arc::new(users);
        Ok(())
    }

    pub async fn list(&self) -> Arc<Vec<User>> {
        self.users.read().await.clone()
    }

    pub async fn get_by_id(&self, id: UserId) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::RemoteError;

    struct FakeUsers(Vec<User>);

    #[async_trait]
    impl UserService for FakeUsers {
        async fn fetch_users(&self) -> Result<Vec<User>, RemoteError> {
            Ok(self.0.clone())
        }
    }

    struct FailingUsers;

    #[async_trait]
    impl UserService for FailingUsers {
        async fn fetch_users(&self) -> Result<Vec<User>, RemoteError> {
            Err(RemoteError::Transport("connection refused".to_string()))
        }
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId(id),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn load_replaces_the_whole_list() {
        let directory = UserDirectory::new(Arc::new(FakeUsers(vec![
            user(1, "Leanne"),
            user(2, "Ervin"),
        ])));

        assert!(directory.list().await.is_empty());
        directory.load().await.unwrap();

        assert_eq!(directory.list().await.len(), 2);
        assert_eq!(directory.get_by_id(UserId(2)).await.unwrap().name, "Ervin");
        assert!(directory.get_by_id(UserId(3)).await.is_none());
    }

    #[tokio::test]
    async fn load_failure_surfaces_and_keeps_the_cache() {
        let directory = UserDirectory::new(Arc::new(FailingUsers));
        let err = directory.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(_)));
        assert!(directory.list().await.is_empty());
    }
}
