use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PostId, Reactions, User, UserId};
use crate::error::RemoteError;

/// A post record as the remote service returns it.
///
/// The placeholder API omits `date` and `reactions`; normalization fills
/// them in. `id` can be absent on a create echo, in which case the store
/// assigns one locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PostId>,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Reactions>,
}

/// Body of a create request (`POST /posts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub reactions: Reactions,
}

/// Body of a full-record update (`PUT /posts/:id`). Carries a refreshed
/// `date`; reactions travel separately via the reactions patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

/// Identifying fields echoed back by `DELETE /posts/:id`. The placeholder
/// API sometimes echoes an empty object, so the id is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletedPost {
    #[serde(default)]
    pub id: Option<PostId>,
}

/// The remote post service boundary.
#[async_trait]
pub trait PostService: Send + Sync {
    /// Fetch the full remote post set.
    async fn fetch_posts(&self) -> Result<Vec<RemotePost>, RemoteError>;

    /// Fetch the posts authored by one user.
    async fn fetch_posts_by_user(&self, user_id: UserId) -> Result<Vec<RemotePost>, RemoteError>;

    /// Create a post; the echo may or may not carry a server-assigned id.
    async fn create_post(&self, post: NewPost) -> Result<RemotePost, RemoteError>;

    /// Replace a post's title/body/author and refresh its date.
    async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<RemotePost, RemoteError>;

    /// Send the full five-counter snapshot (not a delta).
    async fn patch_reactions(
        &self,
        id: PostId,
        reactions: &Reactions,
    ) -> Result<RemotePost, RemoteError>;

    /// Delete a post.
    async fn delete_post(&self, id: PostId) -> Result<DeletedPost, RemoteError>;
}

/// The remote user service boundary.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, RemoteError>;
}
