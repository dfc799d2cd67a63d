//! Client-credentials token exchange with the translator's authentication endpoint.

use crate::error::{TranslationError, TranslationResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Seconds shaved off a token's lifetime before it is considered stale
const EXPIRY_SKEW_SECS: i64 = 30;

/// Client id and secret taken from the translation settings record
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the authentication endpoint
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, deserialize_with = "seconds_from_string_or_number")]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

impl AccessToken {
    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// The legacy endpoint sends `"expires_in": "600"`, newer ones send a number.
fn seconds_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Whether tokens are fetched per translation call or reused until they expire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    #[default]
    PerCall,
    ReuseUntilExpiry,
}

struct CachedToken {
    client_id: String,
    token: AccessToken,
    expires_at: DateTime<Utc>,
}

/// Instant after which a token issued at `now` is stale, or `None` when
/// `expires_in` does not fit the clock
fn cache_deadline(now: DateTime<Utc>, expires_in: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(expires_in).ok()?.checked_sub(EXPIRY_SKEW_SECS)?;
    now.checked_add_signed(Duration::try_seconds(secs)?)
}

pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    scope: String,
    policy: TokenPolicy,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, token_url: &str, scope: &str) -> Self {
        Self {
            client,
            token_url: token_url.to_string(),
            scope: scope.to_string(),
            policy: TokenPolicy::PerCall,
            cache: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Exchange client credentials for a bearer token.
    ///
    /// Under [`TokenPolicy::PerCall`] every call hits the network. Under
    /// [`TokenPolicy::ReuseUntilExpiry`] a token for the same client id is
    /// reused until shortly before it expires.
    pub async fn acquire_token(&self, credentials: &Credentials) -> TranslationResult<AccessToken> {
        if self.policy == TokenPolicy::ReuseUntilExpiry {
            if let Some(token) = self.cached_token(&credentials.client_id) {
                debug!("Reusing cached translator token");
                return Ok(token);
            }
        }

        let token = self.request_token(credentials).await?;

        if self.policy == TokenPolicy::ReuseUntilExpiry {
            match cache_deadline(Utc::now(), token.expires_in) {
                Some(expires_at) => {
                    let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                    *cache = Some(CachedToken {
                        client_id: credentials.client_id.clone(),
                        token: token.clone(),
                        expires_at,
                    });
                }
                None => warn!(
                    "Token lifetime of {}s is out of range, not caching it",
                    token.expires_in
                ),
            }
        }

        Ok(token)
    }

    fn cached_token(&self, client_id: &str) -> Option<AccessToken> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|c| c.client_id == client_id && c.expires_at > Utc::now())
            .map(|c| c.token.clone())
    }

    async fn request_token(&self, credentials: &Credentials) -> TranslationResult<AccessToken> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::Auth(format!("failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|e| TranslationError::Auth(format!("malformed token payload: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(TranslationError::Auth(
                "token payload has an empty access_token".to_string(),
            ));
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id1".to_string(),
            client_secret: "key1".to_string(),
        }
    }

    fn token_response(token: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "http://schemas.xmlsoap.org/ws/2009/11/swt-token-profile-1.0",
            "expires_in": "600",
            "scope": "http://api.microsofttranslator.com"
        })
    }

    fn provider(server: &MockServer) -> TokenProvider {
        TokenProvider::new(
            reqwest::Client::new(),
            &format!("{}/token", server.uri()),
            "http://api.microsofttranslator.com",
        )
    }

    #[test]
    fn test_expires_in_accepts_string_and_number() {
        let from_string: AccessToken =
            serde_json::from_str(r#"{"access_token":"a","expires_in":"600"}"#).unwrap();
        let from_number: AccessToken =
            serde_json::from_str(r#"{"access_token":"a","expires_in":3599}"#).unwrap();

        assert_eq!(from_string.expires_in, 600);
        assert_eq!(from_number.expires_in, 3599);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = AccessToken {
            access_token: "very-secret-token".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 600,
            scope: String::new(),
        };

        assert!(!format!("{:?}", token).contains("very-secret-token"));
        assert!(!format!("{:?}", credentials()).contains("key1"));
    }

    #[test]
    fn test_header_value() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.header_value(), "Bearer abc");
    }

    #[test]
    fn test_cache_deadline_applies_skew() {
        let now = Utc::now();
        assert_eq!(cache_deadline(now, 600), Some(now + Duration::seconds(570)));
        assert_eq!(cache_deadline(now, 10), Some(now - Duration::seconds(20)));
    }

    #[test]
    fn test_cache_deadline_out_of_range_lifetimes() {
        let now = Utc::now();
        assert_eq!(cache_deadline(now, u64::MAX), None);
        assert_eq!(cache_deadline(now, i64::MAX as u64), None);
        assert_eq!(cache_deadline(now, 10_000_000_000_000_000), None);
    }

    #[tokio::test]
    async fn test_acquire_token_posts_client_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=id1"))
            .and(body_string_contains("client_secret=key1"))
            .and(body_string_contains("scope=http"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok-1")))
            .expect(1)
            .mount(&server)
            .await;

        let token = provider(&server)
            .acquire_token(&credentials())
            .await
            .expect("token");

        assert_eq!(token.access_token, "tok-1");
        assert_eq!(token.expires_in, 600);
    }

    #[tokio::test]
    async fn test_special_characters_in_secret_are_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("client_secret=a%2Bb%26c%3D"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok")))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials {
            client_id: "id1".to_string(),
            client_secret: "a+b&c=".to_string(),
        };

        provider(&server).acquire_token(&creds).await.expect("token");
    }

    #[tokio::test]
    async fn test_non_success_status_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .acquire_token(&credentials())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("invalid_client"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .acquire_token(&credentials())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn test_per_call_policy_fetches_every_time() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok")))
            .expect(3)
            .mount(&server)
            .await;

        let provider = provider(&server);
        for _ in 0..3 {
            provider.acquire_token(&credentials()).await.expect("token");
        }
    }

    #[tokio::test]
    async fn test_reuse_policy_fetches_once_per_client() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok")))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server).with_policy(TokenPolicy::ReuseUntilExpiry);
        provider.acquire_token(&credentials()).await.expect("token");
        provider.acquire_token(&credentials()).await.expect("token");

        // A different client id must not reuse the cached token
        let other = Credentials {
            client_id: "id2".to_string(),
            client_secret: "key2".to_string(),
        };
        provider.acquire_token(&other).await.expect("token");
    }

    #[tokio::test]
    async fn test_reuse_policy_refetches_short_lived_tokens() {
        let server = MockServer::start().await;

        // Lifetime below the skew means the token is stale immediately
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "short",
                "expires_in": 10
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server).with_policy(TokenPolicy::ReuseUntilExpiry);
        provider.acquire_token(&credentials()).await.expect("token");
        provider.acquire_token(&credentials()).await.expect("token");
    }

    #[tokio::test]
    async fn test_reuse_policy_with_huge_lifetime_returns_token_uncached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "forever",
                "expires_in": "10000000000000000"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server).with_policy(TokenPolicy::ReuseUntilExpiry);
        let token = provider.acquire_token(&credentials()).await.expect("token");
        assert_eq!(token.access_token, "forever");
        provider.acquire_token(&credentials()).await.expect("token");
    }
}
