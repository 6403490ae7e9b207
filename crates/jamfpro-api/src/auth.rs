// Bearer-token acquisition and caching.
//
// Jamf Pro issues short-lived bearer tokens either from an API client
// (OAuth client credentials) or from a user account (basic auth against
// the token endpoint). Every object request carries the cached token;
// it is refreshed shortly before expiry or after the server rejects it.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Refresh this long before the server-side expiry.
const REFRESH_SKEW_SECS: i64 = 60;

const OAUTH_TOKEN_PATH: &str = "api/oauth/token";
const BASIC_TOKEN_PATH: &str = "api/v1/auth/token";

/// Credentials for obtaining a bearer token.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// API client credentials (Settings > API Roles and Clients).
    OAuth {
        client_id: String,
        client_secret: SecretString,
    },
    /// Jamf Pro user account exchanged for a token via basic auth.
    Basic {
        username: String,
        password: SecretString,
    },
}

/// A bearer token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token can still be sent at `now`, leaving room for the
    /// refresh skew.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(REFRESH_SKEW_SECS) > now
    }
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct BasicTokenResponse {
    token: String,
    expires: DateTime<Utc>,
}

/// Fetches and caches bearer tokens for one Jamf Pro server.
pub struct TokenProvider {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    /// `base_url` must be the server root and end with `/`.
    pub fn new(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Return a usable bearer token, fetching a new one if needed.
    ///
    /// The cache lock is held across the fetch so concurrent callers share
    /// a single token request.
    pub async fn bearer(&self) -> Result<SecretString, Error> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_usable_at(Utc::now()) {
                return Ok(token.value.clone());
            }
            debug!(expires_at = %token.expires_at, "bearer token near expiry, refreshing");
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next request re-authenticates.
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            debug!("bearer token invalidated");
        }
    }

    async fn fetch(&self) -> Result<AccessToken, Error> {
        match &self.credentials {
            Credentials::OAuth {
                client_id,
                client_secret,
            } => {
                let url = self.base_url.join(OAUTH_TOKEN_PATH)?;
                debug!("POST {url} (client credentials)");
                let resp = self
                    .http
                    .post(url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.expose_secret()),
                    ])
                    .send()
                    .await?;
                let body: OAuthTokenResponse = Self::decode(resp).await?;
                let lifetime = TimeDelta::try_seconds(body.expires_in).unwrap_or(TimeDelta::zero());
                Ok(AccessToken::new(
                    SecretString::from(body.access_token),
                    Utc::now() + lifetime,
                ))
            }
            Credentials::Basic { username, password } => {
                let url = self.base_url.join(BASIC_TOKEN_PATH)?;
                debug!("POST {url} (basic auth)");
                let resp = self
                    .http
                    .post(url)
                    .basic_auth(username, Some(password.expose_secret()))
                    .send()
                    .await?;
                let body: BasicTokenResponse = Self::decode(resp).await?;
                Ok(AccessToken::new(SecretString::from(body.token), body.expires))
            }
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("token request rejected (HTTP {})", status.as_u16()),
            });
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
                code: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("token response: {e}"),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_refreshed_inside_skew_window() {
        let now = Utc::now();
        let fresh = AccessToken::new(SecretString::from("a".to_owned()), now + TimeDelta::minutes(20));
        let stale = AccessToken::new(SecretString::from("b".to_owned()), now + TimeDelta::seconds(30));
        assert!(fresh.is_usable_at(now));
        assert!(!stale.is_usable_at(now));
    }
}
