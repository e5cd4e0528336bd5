//! The normalized post store.
//!
//! Owns the authoritative, deduplicated set of posts keyed by id, with the
//! display order derived from `date` at read time. State is published
//! copy-on-write: writers fork the current snapshot, mutate the fork, and
//! swap it in atomically. Readers always observe a complete snapshot.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{Post, PostId, PostUpdate, Reaction, Reactions, UserId};
use crate::error::StoreError;
use crate::ports::{NewPost, PostPatch, PostService, RemotePost};

/// Lifecycle of the collection's initial fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// How a `load()` merges fetched records into an existing collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The fetch is authoritative: an incoming record replaces the existing
    /// entry wholesale.
    #[default]
    Replace,
    /// Append-only: incoming records are added only for ids not yet present.
    KeepExisting,
}

/// An immutable, published snapshot of the collection.
///
/// Entities are shared via `Arc`, so entries untouched by a mutation keep
/// their identity across snapshots. The derived order is computed once per
/// snapshot and cached.
#[derive(Debug, Default)]
pub struct PostsState {
    status: LoadStatus,
    error: Option<String>,
    entities: HashMap<PostId, Arc<Post>>,
    order: OnceLock<Vec<PostId>>,
}

impl PostsState {
    /// Clone this snapshot for mutation. The order cache is carried over;
    /// writers that touch `entities` must call [`Self::reset_order`].
    fn fork(&self) -> PostsState {
        PostsState {
            status: self.status,
            error: self.error.clone(),
            entities: self.entities.clone(),
            order: self.order.clone(),
        }
    }

    fn reset_order(&mut self) {
        self.order = OnceLock::new();
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn ordered_ids(&self) -> &[PostId] {
        self.order.get_or_init(|| {
            let mut ids: Vec<PostId> = self.entities.keys().copied().collect();
            ids.sort_by(|a, b| {
                let (pa, pb) = (&self.entities[a], &self.entities[b]);
                pb.date.cmp(&pa.date).then_with(|| pb.id.cmp(&pa.id))
            });
            ids
        })
    }

    /// All posts, newest first.
    pub fn list_all(&self) -> Vec<Arc<Post>> {
        self.ordered_ids()
            .iter()
            .map(|id| Arc::clone(&self.entities[id]))
            .collect()
    }

    pub fn get(&self, id: PostId) -> Option<Arc<Post>> {
        self.entities.get(&id).cloned()
    }

    /// Posts authored by one user, newest first.
    pub fn list_by_user(&self, user_id: UserId) -> Vec<Arc<Post>> {
        self.ordered_ids()
            .iter()
            .filter_map(|id| {
                let post = &self.entities[id];
                (post.user_id == user_id).then(|| Arc::clone(post))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn next_local_id(&self) -> PostId {
        PostId(self.entities.keys().map(|id| id.0).max().unwrap_or(0) + 1)
    }
}

/// The normalized post store.
///
/// All operations are a single remote round trip; none retries. Concurrent
/// `load()` calls are not deduplicated - each applies its merge in
/// completion order, a documented race inherited from the design.
pub struct PostStore {
    remote: Arc<dyn PostService>,
    merge_policy: MergePolicy,
    state: RwLock<Arc<PostsState>>,
}

impl PostStore {
    pub fn new(remote: Arc<dyn PostService>) -> Self {
        Self::with_merge_policy(remote, MergePolicy::default())
    }

    pub fn with_merge_policy(remote: Arc<dyn PostService>, merge_policy: MergePolicy) -> Self {
        Self {
            remote,
            merge_policy,
            state: RwLock::new(Arc::new(PostsState::default())),
        }
    }

    /// The current published snapshot. Selectors live on the snapshot.
    pub async fn snapshot(&self) -> Arc<PostsState> {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> LoadStatus {
        self.snapshot().await.status()
    }

    pub async fn list_all(&self) -> Vec<Arc<Post>> {
        self.snapshot().await.list_all()
    }

    pub async fn get(&self, id: PostId) -> Option<Arc<Post>> {
        self.snapshot().await.get(id)
    }

    pub async fn list_by_user(&self, user_id: UserId) -> Vec<Arc<Post>> {
        self.snapshot().await.list_by_user(user_id)
    }

    /// Fetch the full remote post set and merge it in.
    ///
    /// The caller is responsible for only triggering this while the status
    /// is `Idle`; the store does not guard or dedup loads itself. On failure
    /// the status becomes `Rejected` with the message captured, and the
    /// entities are left untouched.
    pub async fn load(&self) -> Result<(), StoreError> {
        {
            let mut guard = self.state.write().await;
            let mut next = guard.fork();
            next.status = LoadStatus::Pending;
            next.error = None;
            *guard = Arc::new(next);
        }

        match self.remote.fetch_posts().await {
            Ok(records) => {
                let fetched_at = Utc::now();
                let mut guard = self.state.write().await;
                let mut next = guard.fork();
                next.status = LoadStatus::Fulfilled;
                merge_records(&mut next, records, self.merge_policy, fetched_at);
                next.reset_order();
                tracing::debug!(posts = next.entities.len(), "post collection loaded");
                *guard = Arc::new(next);
                Ok(())
            }
            Err(err) => {
                let mut guard = self.state.write().await;
                let mut next = guard.fork();
                next.status = LoadStatus::Rejected;
                next.error = Some(err.to_string());
                tracing::warn!(error = %err, "post load failed");
                *guard = Arc::new(next);
                Err(err.into())
            }
        }
    }

    /// Fetch one user's posts and merge them in under the same
    /// normalization and merge policy as `load()`. Leaves `status` alone -
    /// the collection lifecycle tracks the full fetch only.
    pub async fn load_by_user(&self, user_id: UserId) -> Result<(), StoreError> {
        let records = self.remote.fetch_posts_by_user(user_id).await?;
        let fetched_at = Utc::now();
        let mut guard = self.state.write().await;
        let mut next = guard.fork();
        merge_records(&mut next, records, self.merge_policy, fetched_at);
        next.reset_order();
        tracing::debug!(%user_id, "user posts merged");
        *guard = Arc::new(next);
        Ok(())
    }

    /// Create a post. Non-optimistic: the entity is inserted only after the
    /// remote service confirms the write.
    pub async fn add(
        &self,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<Arc<Post>, StoreError> {
        if user_id.0 == 0 {
            return Err(StoreError::Validation { field: "user_id" });
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation { field: "title" });
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::Validation { field: "body" });
        }

        let draft = NewPost {
            user_id,
            title: title.to_string(),
            body: body.to_string(),
            date: Utc::now(),
            reactions: Reactions::default(),
        };
        let created = self.remote.create_post(draft.clone()).await?;

        let mut guard = self.state.write().await;
        let mut next = guard.fork();
        let id = match created.id {
            Some(id) if !next.entities.contains_key(&id) => id,
            assigned => {
                let local = next.next_local_id();
                if let Some(taken) = assigned {
                    tracing::debug!(server_id = %taken, local_id = %local, "server-assigned id already present, allocating locally");
                }
                local
            }
        };
        let post = Arc::new(Post {
            id,
            user_id: created.user_id,
            title: created.title,
            body: created.body,
            date: created.date.unwrap_or(draft.date),
            reactions: created.reactions.unwrap_or_default(),
        });
        next.entities.insert(id, Arc::clone(&post));
        next.reset_order();
        tracing::debug!(post_id = %id, "post added");
        *guard = Arc::new(next);
        Ok(post)
    }

    /// Shallow-merge title/body/author onto an existing post and refresh its
    /// date. Non-optimistic: local state is untouched until the remote
    /// confirms, and left unchanged on failure. Reactions are never touched.
    pub async fn update(&self, id: PostId, fields: PostUpdate) -> Result<Arc<Post>, StoreError> {
        let existing = self
            .snapshot()
            .await
            .get(id)
            .ok_or_else(|| StoreError::post_not_found(id))?;

        let patch = PostPatch {
            user_id: fields.user_id.unwrap_or(existing.user_id),
            title: fields.title.unwrap_or_else(|| existing.title.clone()),
            body: fields.body.unwrap_or_else(|| existing.body.clone()),
            date: Utc::now(),
        };
        let echoed = self.remote.update_post(id, patch.clone()).await?;

        let mut guard = self.state.write().await;
        let current = guard
            .entities
            .get(&id)
            .ok_or_else(|| StoreError::post_not_found(id))?;
        let post = Arc::new(Post {
            id,
            user_id: echoed.user_id,
            title: echoed.title,
            body: echoed.body,
            date: echoed.date.unwrap_or(patch.date),
            reactions: current.reactions,
        });
        let mut next = guard.fork();
        next.entities.insert(id, Arc::clone(&post));
        next.reset_order();
        tracing::debug!(post_id = %id, "post updated");
        *guard = Arc::new(next);
        Ok(post)
    }

    /// Delete a post. Removed from the collection on confirmed success only.
    pub async fn remove(&self, id: PostId) -> Result<(), StoreError> {
        if self.snapshot().await.get(id).is_none() {
            return Err(StoreError::post_not_found(id));
        }
        self.remote.delete_post(id).await?;

        let mut guard = self.state.write().await;
        let mut next = guard.fork();
        next.entities.remove(&id);
        next.reset_order();
        tracing::debug!(post_id = %id, "post removed");
        *guard = Arc::new(next);
        Ok(())
    }

    /// Optimistically increment one reaction counter.
    ///
    /// The incremented counters are published before the remote call and the
    /// full five-counter snapshot is sent (not a delta). On remote failure
    /// the captured pre-mutation snapshot is restored exactly. Scoped
    /// per-call: increments on other posts are unaffected; concurrent
    /// increments of the same counter on the same post are not serialized.
    pub async fn increment_reaction(
        &self,
        id: PostId,
        reaction: Reaction,
    ) -> Result<(), StoreError> {
        let before;
        let bumped;
        {
            let mut guard = self.state.write().await;
            let existing = guard
                .entities
                .get(&id)
                .ok_or_else(|| StoreError::post_not_found(id))?;
            before = existing.reactions;
            let mut counters = before;
            counters.bump(reaction);
            bumped = counters;

            let mut post = Post::clone(existing);
            post.reactions = bumped;
            let mut next = guard.fork();
            next.entities.insert(id, Arc::new(post));
            next.reset_order();
            *guard = Arc::new(next);
        }

        match self.remote.patch_reactions(id, &bumped).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(post_id = %id, reaction = %reaction, error = %err, "reaction patch failed, rolling back");
                let mut guard = self.state.write().await;
                if let Some(existing) = guard.entities.get(&id) {
                    let mut post = Post::clone(existing);
                    post.reactions = before;
                    let mut next = guard.fork();
                    next.entities.insert(id, Arc::new(post));
                    next.reset_order();
                    *guard = Arc::new(next);
                }
                Err(err.into())
            }
        }
    }

    /// String entry point for reaction increments. An unknown reaction name
    /// is a not-found failure, same as an unknown post id.
    pub async fn increment_reaction_named(
        &self,
        id: PostId,
        reaction: &str,
    ) -> Result<(), StoreError> {
        let reaction: Reaction = reaction.parse().map_err(|_| StoreError::NotFound {
            entity: "reaction",
            id: reaction.to_string(),
        })?;
        self.increment_reaction(id, reaction).await
    }
}

/// Normalize fetched records and merge them into the snapshot under the
/// given policy.
///
/// Records missing a `date` get a synthetic timestamp one minute older per
/// such record, in array order. Earlier positions therefore read as more
/// recent - observed placeholder-API behavior, preserved as-is. Records
/// missing `reactions` get the zeroed five-counter map.
fn merge_records(
    state: &mut PostsState,
    records: Vec<RemotePost>,
    policy: MergePolicy,
    fetched_at: DateTime<Utc>,
) {
    let mut minutes = 1i64;
    for record in records {
        let Some(id) = record.id else {
            tracing::warn!("fetched record without an id, skipping");
            continue;
        };
        let date = match record.date {
            Some(date) => date,
            None => {
                let date = fetched_at - Duration::minutes(minutes);
                minutes += 1;
                date
            }
        };
        let post = Post {
            id,
            user_id: record.user_id,
            title: record.title,
            body: record.body,
            date,
            reactions: record.reactions.unwrap_or_default(),
        };
        match policy {
            MergePolicy::Replace => {
                state.entities.insert(id, Arc::new(post));
            }
            MergePolicy::KeepExisting => {
                state.entities.entry(id).or_insert_with(|| Arc::new(post));
            }
        }
    }
}
