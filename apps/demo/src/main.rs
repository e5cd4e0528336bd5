//! # Quill Demo
//!
//! One end-to-end pass against a live placeholder API: load the users and
//! posts, create a post, react to it, and log the freshest posts with their
//! authors.

use std::sync::Arc;

use quill_core::domain::{Reaction, UserId};
use quill_core::store::{PostStore, UserDirectory};
use quill_remote::http::{ApiClient, HttpPostService, HttpUserService};

mod config;

use config::DemoConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = DemoConfig::from_env();
    init_tracing(&config);
    tracing::info!(base_url = %config.base_url, "starting quill demo");

    let api = ApiClient::new(config.base_url);
    let posts = PostStore::new(Arc::new(HttpPostService::new(api.clone())));
    let users = UserDirectory::new(Arc::new(HttpUserService::new(api)));

    users.load().await?;
    posts.load().await?;

    let added = posts
        .add(UserId(1), "Hello from quill", "A post created by the demo")
        .await?;
    tracing::info!(post_id = %added.id, "created a post");

    posts.increment_reaction(added.id, Reaction::Rocket).await?;

    for post in posts.list_all().await.into_iter().take(5) {
        let author = match users.get_by_id(post.user_id).await {
            Some(user) => user.name,
            None => "unknown author".to_string(),
        };
        tracing::info!(
            id = %post.id,
            %author,
            date = %post.date.to_rfc3339(),
            rockets = post.reactions.rocket,
            title = %post.title,
            "post"
        );
    }

    Ok(())
}

fn init_tracing(config: &DemoConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quill_demo=debug,quill_remote=debug"));

    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
