// Controller token authentication
//
// Basic-auth token exchange. The token endpoint returns `{ "Token": ... }`;
// the client stores it and attaches it as `X-Auth-Token` on every query.

use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::controller::client::{ControllerClient, preview};
use crate::controller::models::TokenResponse;
use crate::error::Error;

impl ControllerClient {
    /// Exchange the configured credentials for a session token.
    ///
    /// Any stale token is dropped before the exchange, so a failed attempt
    /// never leaves a usable session behind. Endpoint depends on platform:
    /// - DNA Center: `POST /dna/system/api/v1/auth/token`
    /// - Generic: `POST /auth/token`
    pub async fn login(&self) -> Result<(), Error> {
        self.clear_session();

        let url = self.token_url()?;
        let credentials = self.credentials();
        debug!(username = %credentials.username, "requesting token at {}", url);

        let resp = self
            .http()
            .post(url)
            .basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            )
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let body = resp.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("malformed token response: {e}"),
            })?;

        if token.token.trim().is_empty() {
            return Err(Error::Authentication {
                message: "controller returned an empty token".into(),
            });
        }

        self.set_session(token.token);
        debug!("authentication successful");
        Ok(())
    }

    /// Authenticate, reporting the outcome as a boolean.
    ///
    /// Never returns an error: transport failures and rejected credentials
    /// both yield `false` with the session cleared, so callers can keep
    /// running in degraded mode.
    pub async fn authenticate(&self) -> bool {
        match self.login().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, url = %self.base_url(), "controller authentication failed");
                false
            }
        }
    }
}
