//! Store-level flows wired against the in-memory remote.

use std::sync::Arc;

use quill_core::cache::CachedPostStore;
use quill_core::domain::{PostId, PostUpdate, Reaction, Reactions, User, UserId};
use quill_core::ports::{PostService, RemotePost, UserService};
use quill_core::store::{LoadStatus, PostStore, UserDirectory};

use crate::memory::{MemoryPostService, MemoryUserService};

fn seed(id: i64, user: i64, title: &str) -> RemotePost {
    RemotePost {
        id: Some(PostId(id)),
        user_id: UserId(user),
        title: title.to_string(),
        body: format!("body of {title}"),
        date: None,
        reactions: None,
    }
}

#[tokio::test]
async fn empty_store_load_normalizes_the_placeholder_shape() {
    let remote = Arc::new(MemoryPostService::with_posts(vec![seed(1, 1, "a")]));
    let store = PostStore::new(remote as Arc<dyn PostService>);

    store.load().await.unwrap();

    let post = store.get(PostId(1)).await.unwrap();
    assert_eq!(post.reactions, Reactions::default());
    // The synthesized date round-trips as a valid ISO-8601 string.
    let iso = post.date.to_rfc3339();
    assert!(iso.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
    assert_eq!(store.status().await, LoadStatus::Fulfilled);
}

#[tokio::test]
async fn full_crud_flow_against_the_memory_remote() {
    let remote = Arc::new(MemoryPostService::with_posts(vec![
        seed(1, 1, "first"),
        seed(2, 2, "second"),
    ]));
    let store = PostStore::new(Arc::clone(&remote) as Arc<dyn PostService>);
    store.load().await.unwrap();

    // Create: the memory remote assigns the next id.
    let added = store.add(UserId(2), "third", "fresh body").await.unwrap();
    assert_eq!(added.id, PostId(3));
    assert_eq!(store.list_all().await[0].id, PostId(3));

    // Update: only the named field changes.
    let updated = store
        .update(
            PostId(1),
            PostUpdate {
                body: Some("edited body".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "first");
    assert_eq!(updated.body, "edited body");

    // React: the remote's stored counters match the client's view.
    store
        .increment_reaction(PostId(1), Reaction::Rocket)
        .await
        .unwrap();
    let stored = remote
        .fetch_posts()
        .await
        .unwrap()
        .into_iter()
        .find(|post| post.id == Some(PostId(1)))
        .unwrap();
    assert_eq!(stored.reactions.unwrap().rocket, 1);

    // Delete: gone on both sides.
    store.remove(PostId(2)).await.unwrap();
    assert!(store.get(PostId(2)).await.is_none());
    assert_eq!(remote.fetch_posts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_reaction_patch_rolls_back_and_leaves_the_remote_untouched() {
    let remote = Arc::new(MemoryPostService::with_posts(vec![seed(1, 1, "a")]));
    let store = PostStore::new(Arc::clone(&remote) as Arc<dyn PostService>);
    store.load().await.unwrap();

    remote.set_failing(true);
    assert!(
        store
            .increment_reaction(PostId(1), Reaction::Heart)
            .await
            .is_err()
    );
    remote.set_failing(false);

    assert_eq!(store.get(PostId(1)).await.unwrap().reactions.heart, 0);
    let stored = remote.fetch_posts().await.unwrap();
    assert!(stored[0].reactions.is_none());
}

#[tokio::test]
async fn cached_store_refetches_only_when_invalidated() {
    let remote = Arc::new(MemoryPostService::with_posts(vec![seed(1, 1, "a")]));
    let store = CachedPostStore::new(PostStore::new(
        Arc::clone(&remote) as Arc<dyn PostService>
    ));

    store.posts().await.unwrap();
    store.posts().await.unwrap();
    assert_eq!(remote.fetch_count(), 1);

    store.add(UserId(1), "b", "body").await.unwrap();
    let posts = store.posts().await.unwrap();
    assert_eq!(remote.fetch_count(), 2);
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn user_directory_against_the_memory_remote() {
    let remote = Arc::new(MemoryUserService::with_users(vec![
        User {
            id: UserId(1),
            name: "Leanne Graham".to_string(),
        },
        User {
            id: UserId(2),
            name: "Ervin Howell".to_string(),
        },
    ]));
    let directory = UserDirectory::new(Arc::clone(&remote) as Arc<dyn UserService>);

    directory.load().await.unwrap();
    assert_eq!(
        directory.get_by_id(UserId(1)).await.unwrap().name,
        "Leanne Graham"
    );

    remote.set_failing(true);
    assert!(directory.load().await.is_err());
    // The cached list survives the failed reload.
    assert_eq!(directory.list().await.len(), 2);
}
