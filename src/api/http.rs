//! REST transport for the admin API.
//!
//! The API token never leaves its `SecretBox` except when it is written into
//! the `Authorization` header, which reqwest marks as sensitive so it is not
//! printed by its own debug logging.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretBox};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiFailure, EntityEndpoint, GENERIC_FAILURE_MESSAGE, ListEndpoint, ListResponse};
use crate::config::Config;
use crate::error::Result;
use crate::query::ListParams;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RestClient {
    client: Client,
    base_url: String,
    token: Option<SecretBox<String>>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RestClient {
    /// Build a client from the API URL, token and timeout in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, config.api_token(), config.request_timeout())
    }

    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base = url::Url::parse(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            token: token
                .filter(|t| !t.is_empty())
                .map(|t| SecretBox::new(Box::new(t))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the API base.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Typed handle on one resource collection, e.g. `products`.
    pub fn resource<T>(self: &Arc<Self>, path: impl Into<String>) -> RestResource<T> {
        RestResource {
            client: Arc::clone(self),
            path: path.into().trim_matches('/').to_string(),
            _entity: PhantomData,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ApiFailure> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let failure = ApiFailure::from_response(status.as_u16(), &body);
        warn!(status = status.as_u16(), kind = %failure.kind(), "request failed");
        Err(failure)
    }

    async fn send_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<R, ApiFailure> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(status, error = %e, "malformed response body");
            ApiFailure::Server {
                status,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            }
        })
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
    ) -> std::result::Result<R, ApiFailure> {
        let request = self.request(Method::GET, path).query(params.as_pairs());
        self.send_json(request).await
    }

    pub async fn write_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> std::result::Result<R, ApiFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(method, path).json(body);
        self.send_json(request).await
    }

    pub async fn delete(&self, path: &str) -> std::result::Result<(), ApiFailure> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// One REST collection (`/products`, `/users`, ...) deserializing into `T`.
pub struct RestResource<T> {
    client: Arc<RestClient>,
    path: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RestResource<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            path: self.path.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> RestResource<T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.path, id)
    }
}

impl<T> ListEndpoint<T> for RestResource<T>
where
    T: DeserializeOwned + Send,
{
    async fn list(&self, params: &ListParams) -> std::result::Result<ListResponse<T>, ApiFailure> {
        self.client.get_json(&self.path, params).await
    }
}

impl<T, P> EntityEndpoint<P> for RestResource<T>
where
    T: DeserializeOwned + Send,
    P: Serialize + Sync,
{
    type Entity = T;

    async fn fetch(&self, id: i64) -> std::result::Result<T, ApiFailure> {
        self.client
            .get_json(&self.item_path(id), &ListParams::default())
            .await
    }

    async fn create(&self, payload: &P) -> std::result::Result<T, ApiFailure> {
        self.client
            .write_json(Method::POST, &self.path, payload)
            .await
    }

    async fn update(&self, id: i64, payload: &P) -> std::result::Result<T, ApiFailure> {
        self.client
            .write_json(Method::PATCH, &self.item_path(id), payload)
            .await
    }

    async fn delete(&self, id: i64) -> std::result::Result<(), ApiFailure> {
        self.client.delete(&self.item_path(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slashes() {
        let client =
            RestClient::new("http://localhost:8000/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/products"), "http://localhost:8000/api/products");
        assert_eq!(client.url("users/3"), "http://localhost:8000/api/users/3");
    }

    #[test]
    fn test_resource_paths() {
        let client = Arc::new(
            RestClient::new("http://localhost:8000/api", None, Duration::from_secs(5)).unwrap(),
        );
        let promos: RestResource<serde_json::Value> = client.resource("/promocodes/");
        assert_eq!(promos.path(), "promocodes");
        assert_eq!(promos.item_path(12), "promocodes/12");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(RestClient::new("not a url", None, Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = RestClient::new(
            "http://localhost:8000/api",
            Some("s3cret-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cret-token"));
    }
}
