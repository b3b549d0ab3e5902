//! Firebase Cloud Messaging provider (HTTP v1 API).
//!
//! Authenticates with a service-account key through the OAuth2 JWT-bearer
//! grant and sends one v1 request per token, concurrently, reporting the
//! outcomes in token order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use jiff::Timestamp;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::client::ProviderFactory;
use super::provider::{
    DispatchResult, MessagingProvider, MulticastMessage, SendError, SendResponse,
};
use crate::config::MessagingConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::build_http_client;

const PROVIDER: &str = "fcm";

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Cached access tokens are refreshed this long before they expire
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// ============================================================================
// Service account credentials
// ============================================================================

/// The subset of a Google service-account JSON key this provider needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a service-account JSON blob; `source` names where it came from
    pub fn from_json(raw: &str, source: &str) -> AppResult<Self> {
        let mut key: Self = serde_json::from_str(raw).map_err(|e| {
            AppError::configuration(source, format!("Failed to parse {}: {}", source, e))
        })?;

        for (field, value) in [
            ("project_id", &key.project_id),
            ("private_key", &key.private_key),
            ("client_email", &key.client_email),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::configuration(
                    source,
                    format!("{} is missing {}", source, field),
                ));
            }
        }

        // Keys pasted through shells often arrive with escaped newlines
        if !key.private_key.contains('\n') {
            key.private_key = key.private_key.replace("\\n", "\n");
        }

        Ok(key)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// OAuth2
// ============================================================================

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// Unix seconds
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - now > TOKEN_REFRESH_MARGIN_SECS
    }
}

// ============================================================================
// FCM v1 wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    validate_only: bool,
    message: WireMessage<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    token: &'a str,
    notification: WireNotification<'a>,
    #[serde(skip_serializing_if = "is_empty_map")]
    data: &'a HashMap<String, String>,
    android: WireAndroid<'a>,
    apns: WireApns<'a>,
}

#[derive(Debug, Serialize)]
struct WireNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct WireAndroid<'a> {
    /// `HIGH` or `NORMAL`
    priority: String,
    notification: WireAndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
struct WireAndroidNotification<'a> {
    sound: &'a str,
    channel_id: &'a str,
}

#[derive(Debug, Serialize)]
struct WireApns<'a> {
    payload: WireApnsPayload<'a>,
}

#[derive(Debug, Serialize)]
struct WireApnsPayload<'a> {
    aps: WireAps<'a>,
}

#[derive(Debug, Serialize)]
struct WireAps<'a> {
    sound: &'a str,
    badge: u32,
}

fn is_empty_map(map: &&HashMap<String, String>) -> bool {
    map.is_empty()
}

impl<'a> WireMessage<'a> {
    fn new(token: &'a str, message: &'a MulticastMessage) -> Self {
        Self {
            token,
            notification: WireNotification {
                title: &message.notification.title,
                body: &message.notification.body,
            },
            data: &message.data,
            android: WireAndroid {
                priority: message.android.priority.to_uppercase(),
                notification: WireAndroidNotification {
                    sound: &message.android.sound,
                    channel_id: &message.android.channel_id,
                },
            },
            apns: WireApns {
                payload: WireApnsPayload {
                    aps: WireAps {
                        sound: &message.apns.sound,
                        badge: message.apns.badge,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendSuccess {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "@type", default)]
    type_url: Option<String>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

/// Map an FCM error code or RPC status onto a `messaging/*` code
pub fn normalize_error_code(code: &str) -> &'static str {
    match code {
        "UNREGISTERED" | "NOT_FOUND" => "messaging/registration-token-not-registered",
        "INVALID_ARGUMENT" => "messaging/invalid-argument",
        "SENDER_ID_MISMATCH" => "messaging/mismatched-credential",
        "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => "messaging/message-rate-exceeded",
        "UNAVAILABLE" => "messaging/server-unavailable",
        "INTERNAL" => "messaging/internal-error",
        "THIRD_PARTY_AUTH_ERROR" | "APNS_AUTH_ERROR" => "messaging/third-party-auth-error",
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => "messaging/authentication-error",
        _ => "messaging/unknown-error",
    }
}

fn code_for_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "messaging/invalid-argument",
        401 | 403 => "messaging/authentication-error",
        404 => "messaging/registration-token-not-registered",
        429 => "messaging/message-rate-exceeded",
        500 => "messaging/internal-error",
        503 => "messaging/server-unavailable",
        _ => "messaging/unknown-error",
    }
}

/// Turn a non-2xx FCM response into a per-token error
fn parse_error_response(status: StatusCode, body: &str) -> SendError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return SendError::new(
            code_for_status(status),
            format!("FCM responded with status {}: {}", status, body.trim()),
        );
    };

    let error = envelope.error;
    let fcm_code = error
        .details
        .iter()
        .filter(|d| d.type_url.as_deref().is_some_and(|t| t.ends_with("FcmError")))
        .find_map(|d| d.error_code.as_deref());

    let code = match fcm_code.or(error.status.as_deref()) {
        Some(code) => normalize_error_code(code),
        None => code_for_status(status),
    };
    let message = error
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("FCM responded with status {}", status));

    SendError::new(code, message)
}

fn transport_error(error: &reqwest::Error) -> SendError {
    let code = if error.is_timeout() || error.is_connect() {
        "messaging/server-unavailable"
    } else {
        "messaging/unknown-error"
    };
    SendError::new(code, format!("FCM request failed: {}", error))
}

// ============================================================================
// Provider
// ============================================================================

/// FCM HTTP v1 provider bound to one service account
pub struct FcmProvider {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    send_url: String,
    max_concurrency: usize,
    max_tokens: usize,
    dry_run: bool,
    token_cache: Mutex<Option<CachedToken>>,
}

impl FcmProvider {
    /// Create a provider; fails if the private key is not an RSA PEM key
    pub fn new(
        key: ServiceAccountKey,
        config: &MessagingConfig,
        http: reqwest::Client,
    ) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::configuration(
                &config.credentials_env,
                format!(
                    "{} private_key is not a valid RSA PEM key: {}",
                    config.credentials_env, e
                ),
            )
        })?;

        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            config.endpoint.trim_end_matches('/'),
            key.project_id
        );

        Ok(Self {
            key,
            encoding_key,
            http,
            send_url,
            max_concurrency: config.max_concurrency.max(1),
            max_tokens: config.max_tokens,
            dry_run: config.dry_run,
            token_cache: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// Current OAuth2 access token, refreshed when close to expiry
    async fn access_token(&self) -> AppResult<String> {
        let mut cache = self.token_cache.lock().await;
        let now = Timestamp::now().as_second();

        if let Some(cached) = cache.as_ref()
            && cached.is_fresh(now)
        {
            return Ok(cached.access_token.clone());
        }

        let fetched = self.fetch_access_token(now).await?;
        let access_token = fetched.access_token.clone();
        *cache = Some(fetched);

        Ok(access_token)
    }

    async fn fetch_access_token(&self, now: i64) -> AppResult<CachedToken> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let assertion = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::upstream(PROVIDER, format!("Failed to sign OAuth assertion: {}", e)))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| {
                AppError::upstream(PROVIDER, format!("Failed to obtain access token: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                PROVIDER,
                format!(
                    "Token request failed with status {}: {}",
                    status,
                    body.trim()
                ),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::upstream(PROVIDER, format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!(expires_in = token.expires_in, "Obtained FCM access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }

    async fn send_one(
        &self,
        token: &str,
        access_token: &str,
        message: &MulticastMessage,
    ) -> SendResponse {
        let request = SendRequest {
            validate_only: self.dry_run,
            message: WireMessage::new(token, message),
        };

        let response = match self
            .http
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return SendResponse::Failure(transport_error(&e)),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<SendSuccess>().await {
                Ok(sent) => SendResponse::success(sent.name),
                Err(e) => SendResponse::failure(
                    "messaging/internal-error",
                    format!("Unexpected FCM response: {}", e),
                ),
            };
        }

        let body = response.text().await.unwrap_or_default();
        SendResponse::Failure(parse_error_response(status, &body))
    }
}

#[async_trait]
impl MessagingProvider for FcmProvider {
    async fn send_each_for_multicast(
        &self,
        message: &MulticastMessage,
    ) -> AppResult<DispatchResult> {
        if message.tokens.is_empty() {
            return Err(AppError::upstream(
                PROVIDER,
                "tokens must be a non-empty array",
            ));
        }

        if message.tokens.len() > self.max_tokens {
            return Err(AppError::upstream(
                PROVIDER,
                format!(
                    "tokens list must not contain more than {} items",
                    self.max_tokens
                ),
            ));
        }

        let access_token = self.access_token().await?;

        let sends: Vec<_> = message
            .tokens
            .iter()
            .map(|token| self.send_one(token, &access_token, message))
            .collect();

        let responses = stream::iter(sends)
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(DispatchResult::from_responses(responses))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Builds [`FcmProvider`] from the credential environment variable
///
/// The variable is read on every build, so fixing the environment of a
/// running process takes effect on the next request.
pub struct FcmProviderFactory {
    config: MessagingConfig,
    http: reqwest::Client,
}

impl FcmProviderFactory {
    pub fn new(config: MessagingConfig) -> AppResult<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { config, http })
    }

    fn read_credentials(&self) -> AppResult<String> {
        let name = &self.config.credentials_env;
        match std::env::var(name) {
            Ok(raw) if !raw.trim().is_empty() => Ok(raw),
            _ => Err(AppError::configuration(
                name,
                format!("{} environment variable is not set", name),
            )),
        }
    }
}

impl ProviderFactory for FcmProviderFactory {
    fn build(&self) -> AppResult<Arc<dyn MessagingProvider>> {
        let raw = self.read_credentials()?;
        let key = ServiceAccountKey::from_json(&raw, &self.config.credentials_env)?;
        let provider = FcmProvider::new(key, &self.config, self.http.clone())?;

        tracing::info!(
            project_id = provider.project_id(),
            dry_run = self.config.dry_run,
            "FCM provider configured"
        );

        Ok(Arc::new(provider))
    }
}
