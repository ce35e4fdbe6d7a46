//! HTTP client for the external custody service.
//!
//! Two services are involved: an identity service that exchanges a refresh
//! credential for a short-lived access token, and a vault service that
//! holds keys grouped into custody domains.
//!
//! Every request runs under the client's [`CancellationToken`] and a
//! per-request deadline; either firing yields [`SignerError::Cancelled`].

use crate::credential::Credential;
use crate::error::{Result, SignerError};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Default deadline for a single custody request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Custody service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// Base URL of the identity service (token exchange).
    pub ident_url: String,
    /// Base URL of the vault service (keys, signing).
    pub vault_url: String,
    /// Deadline for each request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl CustodyConfig {
    /// Creates a configuration where both services share one base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            ident_url: base_url.clone(),
            vault_url: base_url,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Sets the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// A key as described by the vault service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustodyKey {
    /// Key identifier.
    pub id: Uuid,
    /// `0x`-prefixed hex public key.
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateTokenRequest {
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateKeyRequest<'a> {
    #[serde(rename = "type")]
    key_type: &'static str,
    usage: &'static str,
    spec: &'static str,
    name: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    message: &'a str,
    options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signature: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    message: &'a str,
    signature: &'a str,
    options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    verified: bool,
}

/// Client for the custody service.
#[derive(Debug, Clone)]
pub struct CustodyClient {
    http: Client,
    config: CustodyConfig,
    cancel: CancellationToken,
}

impl CustodyClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CustodyConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tessera/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SignerError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Makes every request of this client observe `token`.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the token that cancels in-flight requests.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns the endpoint configuration.
    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    fn ident(&self, path: &str) -> String {
        format!("{}{path}", self.config.ident_url.trim_end_matches('/'))
    }

    fn vault(&self, path: &str) -> String {
        format!("{}{path}", self.config.vault_url.trim_end_matches('/'))
    }

    /// Runs `fut` under the cancellation token and the request deadline.
    async fn guarded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = self.config.request_timeout();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                Err(SignerError::Cancelled(format!("{op} cancelled by caller")))
            }
            res = tokio::time::timeout(deadline, fut) => match res {
                Ok(inner) => inner,
                Err(_) => Err(SignerError::Cancelled(format!(
                    "{op} exceeded deadline of {}ms",
                    deadline.as_millis()
                ))),
            },
        }
    }

    /// Sends a request and decodes a JSON body from a success response.
    async fn send<T: DeserializeOwned>(&self, op: &'static str, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| SignerError::Transport(format!("{op}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignerError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SignerError::Decode(format!("{op}: {e}")))
    }

    /// Exchanges a refresh credential for an access token.
    ///
    /// Every failure other than cancellation is reported as
    /// [`SignerError::Auth`].
    pub async fn create_token(&self, refresh_token: &Credential) -> Result<Credential> {
        let request = self
            .http
            .post(self.ident("/api/v1/tokens"))
            .header("Authorization", refresh_token.bearer())
            .json(&CreateTokenRequest {
                grant_type: "refresh_token",
            });

        let response: TokenResponse = self
            .guarded("create token", self.send("create token", request))
            .await
            .map_err(|e| match e {
                SignerError::Cancelled(_) => e,
                other => SignerError::Auth(other.to_string()),
            })?;

        match response.access_token {
            Some(token) if !token.is_empty() => Ok(Credential::new(token)),
            _ => Err(SignerError::Auth(
                "token response carried no access token".to_string(),
            )),
        }
    }

    /// Creates a new Ed25519 key in `custody_domain_id`.
    pub async fn create_key(
        &self,
        access_token: &Credential,
        custody_domain_id: Uuid,
        name: &str,
    ) -> Result<CustodyKey> {
        let request = self
            .http
            .post(self.vault(&format!("/api/v1/vaults/{custody_domain_id}/keys")))
            .header("Authorization", access_token.bearer())
            .json(&CreateKeyRequest {
                key_type: "asymmetric",
                usage: "sign/verify",
                spec: "Ed25519",
                name,
                description: "tessera signing key",
            });

        self.guarded("create key", self.send("create key", request))
            .await
    }

    /// Fetches an existing key.
    ///
    /// A `404` is reported as [`SignerError::MissingKey`].
    pub async fn fetch_key(
        &self,
        access_token: &Credential,
        custody_domain_id: Uuid,
        key_id: Uuid,
    ) -> Result<CustodyKey> {
        let request = self
            .http
            .get(self.vault(&format!(
                "/api/v1/vaults/{custody_domain_id}/keys/{key_id}"
            )))
            .header("Authorization", access_token.bearer());

        self.guarded("fetch key", self.send("fetch key", request))
            .await
            .map_err(|e| match e {
                SignerError::Remote { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                    SignerError::MissingKey {
                        custody_domain_id,
                        key_id,
                    }
                }
                other => other,
            })
    }

    /// Signs a hex-encoded message, returning the hex-encoded signature.
    pub async fn sign_message(
        &self,
        access_token: &Credential,
        custody_domain_id: Uuid,
        key_id: Uuid,
        message_hex: &str,
    ) -> Result<String> {
        let request = self
            .http
            .post(self.vault(&format!(
                "/api/v1/vaults/{custody_domain_id}/keys/{key_id}/sign"
            )))
            .header("Authorization", access_token.bearer())
            .json(&SignRequest {
                message: message_hex,
                options: serde_json::Map::new(),
            });

        let response: SignResponse = self
            .guarded("sign message", self.send("sign message", request))
            .await?;

        response
            .signature
            .ok_or_else(|| SignerError::Decode("sign response carried no signature".to_string()))
    }

    /// Asks the vault to verify a hex-encoded signature.
    pub async fn verify_signature(
        &self,
        access_token: &Credential,
        custody_domain_id: Uuid,
        key_id: Uuid,
        message_hex: &str,
        signature_hex: &str,
    ) -> Result<bool> {
        let request = self
            .http
            .post(self.vault(&format!(
                "/api/v1/vaults/{custody_domain_id}/keys/{key_id}/verify"
            )))
            .header("Authorization", access_token.bearer())
            .json(&VerifyRequest {
                message: message_hex,
                signature: signature_hex,
                options: serde_json::Map::new(),
            });

        let response: VerifyResponse = self
            .guarded("verify signature", self.send("verify signature", request))
            .await?;

        Ok(response.verified)
    }
}
