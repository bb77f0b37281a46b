use secrecy::SecretString;
use url::Url;

/// Credentials for authenticating with a network controller.
///
/// Immutable for the lifetime of a [`ControllerClient`](crate::ControllerClient);
/// a new client is built when credentials change.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
        }
    }
}

/// Path layout of the controller's REST API.
///
/// Determines where the token endpoint and the read-only intent endpoints
/// live relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPlatform {
    /// Catalyst Center / DNA Center layout (`/dna/system/api/v1`,
    /// `/dna/intent/api/v1`). Used by the public developer sandbox.
    #[default]
    DnaCenter,
    /// Flat layout: every endpoint hangs directly off the base URL.
    Generic,
}

impl ControllerPlatform {
    /// The token endpoint path.
    pub fn token_path(&self) -> &'static str {
        match self {
            Self::DnaCenter => "/dna/system/api/v1/auth/token",
            Self::Generic => "/auth/token",
        }
    }

    /// The path prefix for read-only query endpoints.
    ///
    /// DNA Center: `/dna/intent/api/v1`
    /// Generic: empty
    pub fn intent_prefix(&self) -> &'static str {
        match self {
            Self::DnaCenter => "/dna/intent/api/v1",
            Self::Generic => "",
        }
    }
}

impl std::fmt::Display for ControllerPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DnaCenter => "dnac",
            Self::Generic => "generic",
        })
    }
}

impl std::str::FromStr for ControllerPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dnac" | "dna-center" | "catalyst-center" => Ok(Self::DnaCenter),
            "generic" | "flat" => Ok(Self::Generic),
            other => Err(format!("expected 'dnac' or 'generic', got '{other}'")),
        }
    }
}
