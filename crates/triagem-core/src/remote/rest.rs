//! REST implementation of the remote store
//!
//! Talks to a PostgREST-style endpoint (`/rest/v1/{table}`) with
//! apikey + bearer authentication. Server errors pass through as
//! [`RemoteError::Api`] without reinterpretation.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use tokio::sync::mpsc;
use tracing::debug;

use super::feed;
use super::{ChangeFeed, RemoteStore};
use crate::config::Config;
use crate::error::RemoteError;
use crate::models::{Application, ApplicationPatch, NewApplication};

/// Column used for server-side ordering of full loads
const ORDER_COLUMN: &str = "submitted_at";

/// PostgREST "return exactly one object" media type
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for the remote applications table
pub struct RestStore {
    http: Client,
    base_url: String,
    realtime_url: String,
    api_key: String,
    table: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Build a store from configuration (anonymous access)
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            realtime_url: config.realtime_url(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            access_token: None,
        }
    }

    /// Attach a signed-in session's access token to all requests
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", bearer)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.headers(self.headers())
    }

    /// Surface non-success responses as an API error with the server's
    /// own message
    async fn check(resp: Response) -> Result<Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for RestStore {
    async fn fetch_all(&self) -> Result<Vec<Application>, RemoteError> {
        let url = format!(
            "{}?select=*&order={}.desc",
            self.endpoint(),
            ORDER_COLUMN
        );
        debug!(%url, "fetching all applications");

        let resp = self.authed(self.http.get(&url)).send().await?;
        let body = Self::check(resp).await?.text().await?;
        let records: Vec<Application> = serde_json::from_str(&body)?;
        Ok(records)
    }

    async fn insert(&self, draft: &NewApplication) -> Result<Application, RemoteError> {
        let resp = self
            .authed(self.http.post(self.endpoint()))
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(draft)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let record: Application = serde_json::from_str(&body)?;
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> Result<Application, RemoteError> {
        let url = format!("{}?id=eq.{}", self.endpoint(), id);
        let resp = self
            .authed(self.http.patch(&url))
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(patch)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let record: Application = serde_json::from_str(&body)?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}?id=eq.{}", self.endpoint(), id);
        let resp = self.authed(self.http.delete(&url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn subscribe(&self) -> Result<ChangeFeed, RemoteError> {
        if self.realtime_url.is_empty() {
            return Err(RemoteError::Feed(
                "realtime URL not configured".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel(64);
        let task = tokio::spawn(feed::run(
            self.realtime_url.clone(),
            self.api_key.clone(),
            self.table.clone(),
            tx,
        ));
        Ok(ChangeFeed::with_guard(rx, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            base_url: "https://project.example.co/".to_string(),
            api_key: "anon-key".to_string(),
            table: "applications".to_string(),
            realtime_url: None,
            data_dir: std::env::temp_dir(),
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let store = RestStore::new(&config());
        assert_eq!(
            store.endpoint(),
            "https://project.example.co/rest/v1/applications"
        );
    }

    #[test]
    fn test_headers_fall_back_to_api_key_bearer() {
        let store = RestStore::new(&config());
        let headers = store.headers();
        assert_eq!(headers.get("apikey").unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-key");
    }

    #[test]
    fn test_headers_prefer_access_token() {
        let store = RestStore::new(&config()).with_access_token("jwt-123");
        let headers = store.headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer jwt-123");
    }
}
