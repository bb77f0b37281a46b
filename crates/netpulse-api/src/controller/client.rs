// Controller HTTP client
//
// Wraps `reqwest::Client` with platform-aware URL construction, session
// token injection and `{ response }` envelope unwrapping. Endpoint methods
// live in `auth.rs` and `inventory.rs`; this module stays focused on
// transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{ControllerPlatform, Credentials};
use crate::controller::models::ResponseEnvelope;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the session token on every query.
pub(crate) const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// A token obtained from the controller's token endpoint.
///
/// Expiry is controller-defined and never advertised, so the only signal
/// that a session is dead is a 401 on a later request.
#[derive(Debug)]
struct Session {
    token: SecretString,
}

/// Raw HTTP client for the controller's REST API.
///
/// Owns exactly one session. The token is process state on this instance
/// only: two clients built from the same credentials never share it.
#[derive(Debug)]
pub struct ControllerClient {
    http: reqwest::Client,
    credentials: Credentials,
    platform: ControllerPlatform,
    session: RwLock<Option<Session>>,
}

impl ControllerClient {
    /// Create a new client from credentials and a `TransportConfig`.
    ///
    /// The transport's timeout bounds every request, including the token
    /// exchange.
    pub fn new(
        credentials: Credentials,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, credentials, platform))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        credentials: Credentials,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            credentials,
            platform,
            session: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.credentials.base_url
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The configured API path layout.
    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── Session management ───────────────────────────────────────────

    /// Whether a token is currently held.
    pub fn has_session(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set_session(&self, token: String) {
        debug!("storing session token");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            token: SecretString::from(token),
        });
    }

    /// Drop the stored token. Subsequent queries fail with `AuthRequired`.
    pub fn clear_session(&self) {
        let previous = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            trace!("session token cleared");
        }
    }

    /// Build the `X-Auth-Token` header value from the current session.
    fn token_header(&self) -> Result<HeaderValue, Error> {
        let guard = self.session.read().unwrap_or_else(PoisonError::into_inner);
        let session = guard.as_ref().ok_or(Error::AuthRequired)?;
        let mut value =
            HeaderValue::from_str(session.token.expose_secret()).map_err(|e| {
                Error::Authentication {
                    message: format!("token is not a valid header value: {e}"),
                }
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Full URL of the token endpoint for the configured platform.
    pub(crate) fn token_url(&self) -> Result<Url, Error> {
        self.join(self.platform.token_path())
    }

    /// Build a query URL: `{base}{intent_prefix}/{path}`.
    pub(crate) fn intent_url(&self, path: &str) -> Result<Url, Error> {
        let prefix = self.platform.intent_prefix().trim_end_matches('/');
        self.join(&format!("{prefix}/{}", path.trim_start_matches('/')))
    }

    fn join(&self, path: &str) -> Result<Url, Error> {
        let base = self.credentials.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and unwrap the `{ response }` envelope.
    ///
    /// Fails with `AuthRequired` before touching the network when no
    /// session is held. A 401 invalidates the stored session.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let token = self.token_header()?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        self.parse_envelope(resp).await
    }

    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("controller rejected session token, invalidating session");
            self.clear_session();
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await?;
        let envelope: ResponseEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        Ok(envelope.response)
    }
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str, platform: ControllerPlatform) -> ControllerClient {
        let creds = Credentials::new(
            Url::parse(base).unwrap(),
            "devnetuser",
            SecretString::from("Cisco123!".to_string()),
        );
        ControllerClient::with_client(reqwest::Client::new(), creds, platform)
    }

    #[test]
    fn dnac_urls() {
        let c = client("https://sandbox.example/", ControllerPlatform::DnaCenter);
        assert_eq!(
            c.token_url().unwrap().as_str(),
            "https://sandbox.example/dna/system/api/v1/auth/token"
        );
        assert_eq!(
            c.intent_url("network-device").unwrap().as_str(),
            "https://sandbox.example/dna/intent/api/v1/network-device"
        );
    }

    #[test]
    fn generic_urls_keep_base_path() {
        let c = client("https://ctl.example/api", ControllerPlatform::Generic);
        assert_eq!(
            c.intent_url("/network-health").unwrap().as_str(),
            "https://ctl.example/api/network-health"
        );
    }

    #[test]
    fn session_lifecycle() {
        let c = client("https://ctl.example", ControllerPlatform::Generic);
        assert!(!c.has_session());
        assert!(matches!(c.token_header(), Err(Error::AuthRequired)));

        c.set_session("abc".into());
        assert!(c.has_session());
        assert!(c.token_header().unwrap().is_sensitive());

        c.clear_session();
        assert!(!c.has_session());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), 200);
    }
}
