//! Tag-based cache invalidation, layered over the post store.
//!
//! Each cached read records the set of tags it depends on; each mutation
//! declares the set of tags it invalidates. Overlap marks the affected
//! entries stale, and a stale read refetches through the inner store before
//! serving. Pure tag dependency - no time-based expiry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Post, PostId, PostUpdate, Reaction, UserId};
use crate::error::StoreError;
use crate::store::PostStore;

/// A label attached to a cached result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTag {
    /// The post list as a whole.
    PostList,
    /// A single post.
    Post(PostId),
}

/// Identity of a cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum QueryKey {
    All,
    ById(PostId),
    ByUser(UserId),
}

struct CacheEntry {
    tags: HashSet<QueryTag>,
    stale: bool,
}

/// Decorator adding the pull-style caching policy to a [`PostStore`].
///
/// Invalidation matrix: `add` invalidates the list; `update` and `remove`
/// invalidate the single post (the list entry stays intact);
/// `increment_reaction` invalidates nothing and relies on the store's
/// optimistic patch.
pub struct CachedPostStore {
    store: PostStore,
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl CachedPostStore {
    pub fn new(store: PostStore) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped store, for direct snapshot access.
    pub fn inner(&self) -> &PostStore {
        &self.store
    }

    /// Refetch through the inner store unless the entry is present and
    /// fresh. The by-user read refetches through the targeted remote query;
    /// everything else re-runs the full load.
    async fn ensure_fresh(&self, key: QueryKey) -> Result<(), StoreError> {
        let fresh = self
            .entries
            .read()
            .await
            .get(&key)
            .is_some_and(|entry| !entry.stale);
        if fresh {
            return Ok(());
        }
        tracing::debug!(?key, "cache entry stale or missing, refetching");
        match key {
            QueryKey::ByUser(user_id) => self.store.load_by_user(user_id).await,
            QueryKey::All | QueryKey::ById(_) => self.store.load().await,
        }
    }

    async fn record(&self, key: QueryKey, tags: HashSet<QueryTag>) {
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { tags, stale: false });
    }

    /// Mark every entry whose tag set overlaps `tags` as stale.
    async fn invalidate(&self, tags: &[QueryTag]) {
        let mut entries = self.entries.write().await;
        for (key, entry) in entries.iter_mut() {
            if !entry.stale && tags.iter().any(|tag| entry.tags.contains(tag)) {
                tracing::debug!(?key, "cache entry invalidated");
                entry.stale = true;
            }
        }
    }

    /// The full post list, newest first. Depends on the list tag.
    pub async fn posts(&self) -> Result<Vec<Arc<Post>>, StoreError> {
        self.ensure_fresh(QueryKey::All).await?;
        let posts = self.store.snapshot().await.list_all();
        self.record(QueryKey::All, HashSet::from([QueryTag::PostList]))
            .await;
        Ok(posts)
    }

    /// One post. Depends on its own tag only.
    pub async fn post(&self, id: PostId) -> Result<Option<Arc<Post>>, StoreError> {
        self.ensure_fresh(QueryKey::ById(id)).await?;
        let post = self.store.snapshot().await.get(id);
        self.record(QueryKey::ById(id), HashSet::from([QueryTag::Post(id)]))
            .await;
        Ok(post)
    }

    /// One user's posts, newest first. Depends on the tag of every post in
    /// the result.
    pub async fn posts_by_user(&self, user_id: UserId) -> Result<Vec<Arc<Post>>, StoreError> {
        self.ensure_fresh(QueryKey::ByUser(user_id)).await?;
        let posts = self.store.snapshot().await.list_by_user(user_id);
        let tags = posts.iter().map(|post| QueryTag::Post(post.id)).collect();
        self.record(QueryKey::ByUser(user_id), tags).await;
        Ok(posts)
    }

    pub async fn add(
        &self,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<Arc<Post>, StoreError> {
        let post = self.store.add(user_id, title, body).await?;
        self.invalidate(&[QueryTag::PostList]).await;
        Ok(post)
    }

    pub async fn update(&self, id: PostId, fields: PostUpdate) -> Result<Arc<Post>, StoreError> {
        let post = self.store.update(id, fields).await?;
        self.invalidate(&[QueryTag::Post(id)]).await;
        Ok(post)
    }

    pub async fn remove(&self, id: PostId) -> Result<(), StoreError> {
        self.store.remove(id).await?;
        self.invalidate(&[QueryTag::Post(id)]).await;
        Ok(())
    }

    /// Declares no invalidations; the store's optimistic patch keeps every
    /// cached view current.
    pub async fn increment_reaction(
        &self,
        id: PostId,
        reaction: Reaction,
    ) -> Result<(), StoreError> {
        self.store.increment_reaction(id, reaction).await
    }
}
