//! HTTP adapter over the placeholder REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use quill_core::domain::{PostId, Reactions, User, UserId};
use quill_core::error::RemoteError;
use quill_core::ports::{DeletedPost, NewPost, PostPatch, PostService, RemotePost, UserService};

/// Shared request plumbing for the placeholder API: one `reqwest::Client`
/// and the base URL, cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message,
            });
        }
        response.json().await.map_err(map_transport)
    }
}

fn map_transport(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

/// The `PATCH /posts/:id` body carries the full counter map.
#[derive(Serialize)]
struct ReactionsBody<'a> {
    reactions: &'a Reactions,
}

/// `PostService` over the placeholder REST API.
#[derive(Debug, Clone)]
pub struct HttpPostService {
    api: ApiClient,
}

impl HttpPostService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PostService for HttpPostService {
    async fn fetch_posts(&self) -> Result<Vec<RemotePost>, RemoteError> {
        let url = self.api.url("/posts");
        tracing::debug!(%url, "GET posts");
        let response = self.api.client.get(&url).send().await.map_err(map_transport)?;
        ApiClient::decode(response).await
    }

    async fn fetch_posts_by_user(&self, user_id: UserId) -> Result<Vec<RemotePost>, RemoteError> {
        let url = self.api.url("/posts");
        tracing::debug!(%url, %user_id, "GET posts by user");
        let response = self
            .api
            .client
            .get(&url)
            .query(&[("userId", user_id.0)])
            .send()
            .await
            .map_err(map_transport)?;
        ApiClient::decode(response).await
    }

    async fn create_post(&self, post: NewPost) -> Result<RemotePost, RemoteError> {
        let url = self.api.url("/posts");
        tracing::debug!(%url, "POST post");
        let response = self
            .api
            .client
            .post(&url)
            .json(&post)
            .send()
            .await
            .map_err(map_transport)?;
        ApiClient::decode(response).await
    }

    async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<RemotePost, RemoteError> {
        let url = self.api.url(&format!("/posts/{id}"));
        tracing::debug!(%url, "PUT post");
        let response = self
            .api
            .client
            .put(&url)
            .json(&patch)
            .send()
            .await
            .map_err(map_transport)?;
        ApiClient::decode(response).await
    }

    async fn patch_reactions(
        &self,
        id: PostId,
        reactions: &Reactions,
    ) -> Result<RemotePost, RemoteError> {
        let url = self.api.url(&format!("/posts/{id}"));
        tracing::debug!(%url, "PATCH reactions");
        let response = self
            .api
            .client
            .patch(&url)
            .json(&ReactionsBody { reactions })
            .send()
            .await
            .map_err(map_transport)?;
        ApiClient::decode(response).await
    }

    async fn delete_post(&self, id: PostId) -> Result<DeletedPost, RemoteError> {
        let url = self.api.url(&format!("/posts/{id}"));
        tracing::debug!(%url, "DELETE post");
        let response = self
            .api
            .client
            .delete(&url)
            .send()
            .await
            .map_err(map_transport)?;
        ApiClient::decode(response).await
    }
}

/// `UserService` over the placeholder REST API.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    api: ApiClient,
}

impl HttpUserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserService for HttpUserService {
    async fn fetch_users(&self) -> Result<Vec<User>, RemoteError> {
        let url = self.api.url("/users");
        tracing::debug!(%url, "GET users");
        let response = self.api.client.get(&url).send().await.map_err(map_transport)?;
        ApiClient::decode(response).await
    }
}
