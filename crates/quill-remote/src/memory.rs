//! In-memory remote service - used as fallback when no network is wanted
//! and as the test double for store-level flows.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{PostId, Reactions, User, UserId};
use quill_core::error::RemoteError;
use quill_core::ports::{DeletedPost, NewPost, PostPatch, PostService, RemotePost, UserService};

/// In-process post service backed by a `Vec` of wire records.
///
/// Supports failure injection (`set_failing`) and counts fetches so callers
/// can observe cache hits versus refetches. Data is lost on drop.
pub struct MemoryPostService {
    posts: RwLock<Vec<RemotePost>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl MemoryPostService {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    pub fn with_posts(posts: Vec<RemotePost>) -> Self {
        let next_id = posts
            .iter()
            .filter_map(|post| post.id.map(|id| id.0))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            posts: RwLock::new(posts),
            next_id: AtomicI64::new(next_id),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    /// While set, every request fails with a 500.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteError::Http {
                status: 500,
                message: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn not_found(id: PostId) -> RemoteError {
        RemoteError::Http {
            status: 404,
            message: format!("no post with id {id}"),
        }
    }
}

impl Default for MemoryPostService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostService for MemoryPostService {
    async fn fetch_posts(&self) -> Result<Vec<RemotePost>, RemoteError> {
        self.check()?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.posts.read().await.clone())
    }

    async fn fetch_posts_by_user(&self, user_id: UserId) -> Result<Vec<RemotePost>, RemoteError> {
        self.check()?;
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_post(&self, post: NewPost) -> Result<RemotePost, RemoteError> {
        self.check()?;
        let id = PostId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = RemotePost {
            id: Some(id),
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            date: Some(post.date),
            reactions: Some(post.reactions),
        };
        self.posts.write().await.push(record.clone());
        tracing::debug!(post_id = %id, "memory remote created post");
        Ok(record)
    }

    async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<RemotePost, RemoteError> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let record = posts
            .iter_mut()
            .find(|post| post.id == Some(id))
            .ok_or_else(|| Self::not_found(id))?;
        record.user_id = patch.user_id;
        record.title = patch.title;
        record.body = patch.body;
        record.date = Some(patch.date);
        Ok(record.clone())
    }

    async fn patch_reactions(
        &self,
        id: PostId,
        reactions: &Reactions,
    ) -> Result<RemotePost, RemoteError> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let record = posts
            .iter_mut()
            .find(|post| post.id == Some(id))
            .ok_or_else(|| Self::not_found(id))?;
        record.reactions = Some(*reactions);
        if record.date.is_none() {
            record.date = Some(Utc::now());
        }
        Ok(record.clone())
    }

    async fn delete_post(&self, id: PostId) -> Result<DeletedPost, RemoteError> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| post.id != Some(id));
        if posts.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(DeletedPost { id: Some(id) })
    }
}

/// In-process user service with a fixed list.
pub struct MemoryUserService {
    users: Vec<User>,
    failing: AtomicBool,
}

impl MemoryUserService {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserService for MemoryUserService {
    async fn fetch_users(&self) -> Result<Vec<User>, RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Http {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(user: i64, title: &str) -> NewPost {
        NewPost {
            user_id: UserId(user),
            title: title.to_string(),
            body: "b".to_string(),
            date: Utc::now(),
            reactions: Reactions::default(),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let remote = MemoryPostService::new();
        let first = remote.create_post(new_post(1, "a")).await.unwrap();
        let second = remote.create_post(new_post(1, "b")).await.unwrap();
        assert_eq!(first.id, Some(PostId(1)));
        assert_eq!(second.id, Some(PostId(2)));
        assert_eq!(remote.fetch_posts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_ids_report_404() {
        let remote = MemoryPostService::new();
        let err = remote.delete_post(PostId(9)).await.unwrap_err();
        assert!(matches!(err, RemoteError::Http { status: 404, .. }));
        let err = remote
            .update_post(
                PostId(9),
                PostPatch {
                    user_id: UserId(1),
                    title: "t".to_string(),
                    body: "b".to_string(),
                    date: Utc::now(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn failure_injection_covers_every_call() {
        let remote = MemoryPostService::new();
        remote.set_failing(true);
        assert!(remote.fetch_posts().await.is_err());
        assert!(remote.create_post(new_post(1, "a")).await.is_err());
        remote.set_failing(false);
        assert!(remote.fetch_posts().await.is_ok());
    }
}
