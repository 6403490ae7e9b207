// Hand-crafted async HTTP client for the Jamf Pro API.
//
// Base path: {server}/api/
// Auth: bearer token from `TokenProvider`

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::{Credentials, TokenProvider};
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ApiErrorBody, CreatedRef, Page};

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Async client for the Jamf Pro API.
///
/// Endpoints are addressed relative to `/api/`, e.g. `v1/buildings`.
/// Object bodies are passed through as `serde_json::Value`; typing them is
/// the job of the caller's field tables.
pub struct JamfClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenProvider,
    timeout: Duration,
}

impl JamfClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and a transport config.
    pub fn from_credentials(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(base_url, http, credentials)?;
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        http: reqwest::Client,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        let tokens = TokenProvider::new(http.clone(), base_url.clone(), credentials);
        Ok(Self {
            http,
            base_url,
            tokens,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Server root with a trailing slash, so relative joins keep any
    /// context path (`https://host/jamf/`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The server root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token provider (exposed for explicit re-authentication).
    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join("api/")?.join(path.trim_start_matches('/'))?)
    }

    fn object_url(&self, endpoint: &str, id: &str) -> Result<Url, Error> {
        if id.is_empty() {
            return Err(Error::InvalidId { id: id.to_owned() });
        }
        let mut url = self.url(endpoint)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidId { id: id.to_owned() })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let token = self.tokens.bearer().await?;
        let resp = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    Error::Transport(e)
                }
            })?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        Ok(resp)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.send(self.http.get(url)).await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self.send(self.http.get(url).query(params)).await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        let resp = self.send(self.http.put(url).json(body)).await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.send(self.http.delete(url)).await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "bearer token rejected".into(),
            };
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ApiErrorBody>(&raw) {
            Ok(body) => Error::Api {
                status: status.as_u16(),
                message: body.message().unwrap_or_else(|| status.to_string()),
                code: body.code(),
            },
            Err(_) => Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() { status.to_string() } else { raw },
                code: None,
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET {endpoint}/{id}`
    pub async fn get_object(&self, endpoint: &str, id: &str) -> Result<Value, Error> {
        let url = self.object_url(endpoint, id)?;
        self.get(url).await
    }

    /// `POST {endpoint}` -- returns the id the server assigned.
    pub async fn create_object(&self, endpoint: &str, body: &Value) -> Result<CreatedRef, Error> {
        let url = self.url(endpoint)?;
        self.post(url, body).await
    }

    /// `PUT {endpoint}/{id}` -- full replacement, returns the stored object.
    pub async fn update_object(&self, endpoint: &str, id: &str, body: &Value) -> Result<Value, Error> {
        let url = self.object_url(endpoint, id)?;
        self.put(url, body).await
    }

    /// `DELETE {endpoint}/{id}`
    pub async fn delete_object(&self, endpoint: &str, id: &str) -> Result<(), Error> {
        let url = self.object_url(endpoint, id)?;
        self.delete(url).await
    }

    /// Fetch one page of a collection (zero-based `page`).
    pub async fn list_page(
        &self,
        endpoint: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Value>, Error> {
        let url = self.url(endpoint)?;
        self.get_with_params(
            url,
            &[("page", page.to_string()), ("page-size", page_size.to_string())],
        )
        .await
    }

    /// Collect all pages into a single `Vec`.
    pub async fn list_all(&self, endpoint: &str) -> Result<Vec<Value>, Error> {
        let mut all = Vec::new();
        let mut page = 0;

        loop {
            let batch = self.list_page(endpoint, page, DEFAULT_PAGE_SIZE).await?;
            let received = batch.results.len();
            all.extend(batch.results);

            let collected = i64::try_from(all.len()).unwrap_or(i64::MAX);
            if received < DEFAULT_PAGE_SIZE as usize || collected >= batch.total_count {
                break;
            }
            page += 1;
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use secrecy::SecretString;

    fn client(base: &str) -> JamfClient {
        JamfClient::with_client(
            base,
            reqwest::Client::new(),
            Credentials::OAuth {
                client_id: "id".into(),
                client_secret: SecretString::from("secret".to_owned()),
            },
        )
        .unwrap()
    }

    #[test]
    fn urls_keep_context_path() {
        let c = client("https://example.jamfcloud.com/jamf");
        assert_eq!(
            c.url("v1/buildings").unwrap().as_str(),
            "https://example.jamfcloud.com/jamf/api/v1/buildings"
        );
    }

    #[test]
    fn object_ids_are_escaped() {
        let c = client("https://example.jamfcloud.com/");
        assert_eq!(
            c.object_url("v1/buildings", "a/b").unwrap().as_str(),
            "https://example.jamfcloud.com/api/v1/buildings/a%2Fb"
        );
    }

    #[test]
    fn empty_object_id_is_rejected() {
        let c = client("https://example.jamfcloud.com");
        assert!(matches!(
            c.object_url("v1/buildings", ""),
            Err(Error::InvalidId { .. })
        ));
    }
}
