//! Client configuration.
//!
//! `ClientConfig` says where the API lives; `TransportConfig` says how the
//! default transport reaches it. Both are plain values passed at
//! construction. Defaults target the public cloud; private deployments
//! override the base URL and paths through the `with_*` builders, a
//! deserialized config section, or `ClientConfig::from_env`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.im.jpush.cn";
pub const DEFAULT_USER_PATH: &str = "/v1/users";
pub const DEFAULT_ADMIN_PATH: &str = "/v1/admins";

pub const ENV_BASE_URL: &str = "JMESSAGE_BASE_URL";
pub const ENV_USER_PATH: &str = "JMESSAGE_USER_PATH";
pub const ENV_ADMIN_PATH: &str = "JMESSAGE_ADMIN_PATH";

/// Base URL and resource paths for the user API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_path: String,
    pub admin_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_path: DEFAULT_USER_PATH.to_string(),
            admin_path: DEFAULT_ADMIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `JMESSAGE_BASE_URL`, `JMESSAGE_USER_PATH` and
    /// `JMESSAGE_ADMIN_PATH` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(user_path) = lookup(ENV_USER_PATH) {
            config.user_path = user_path;
        }
        if let Some(admin_path) = lookup(ENV_ADMIN_PATH) {
            config.admin_path = admin_path;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_path(mut self, user_path: impl Into<String>) -> Self {
        self.user_path = user_path.into();
        self
    }

    pub fn with_admin_path(mut self, admin_path: impl Into<String>) -> Self {
        self.admin_path = admin_path.into();
        self
    }

    /// Canonical form: no trailing slash on the base URL, a leading and no
    /// trailing slash on each resource path.
    pub(crate) fn normalized(&self) -> Result<Self> {
        let base_url = self.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ApiError::invalid("base_url must not be empty"));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            user_path: normalize_path("user_path", &self.user_path)?,
            admin_path: normalize_path("admin_path", &self.admin_path)?,
        })
    }
}

fn normalize_path(field: &str, path: &str) -> Result<String> {
    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        return Err(ApiError::invalid(format!("{field} must not be empty")));
    }
    Ok(format!("/{path}"))
}

/// Proxy the default transport tunnels through.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct HttpProxy {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl HttpProxy {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Rejects values that cannot sit verbatim in the proxy URL authority.
    /// The proxy URL is not percent-decoded, so a delimiter in the host or
    /// credentials would silently redirect traffic to another host.
    pub fn validate(&self) -> Result<()> {
        const DELIMITERS: [char; 4] = ['/', '?', '#', '@'];
        let host = self.host.trim();
        if host.is_empty() || host.contains(|c: char| DELIMITERS.contains(&c) || c == ':' || c.is_whitespace()) {
            return Err(ApiError::invalid(format!("invalid proxy host {:?}", self.host)));
        }
        if let Some(user) = &self.username {
            if user.contains(|c: char| DELIMITERS.contains(&c) || c == ':') {
                return Err(ApiError::invalid("proxy username must not contain '/', '?', '#', '@' or ':'"));
            }
        }
        if let Some(pass) = &self.password {
            if pass.contains(|c: char| DELIMITERS.contains(&c)) {
                return Err(ApiError::invalid("proxy password must not contain '/', '?', '#' or '@'"));
            }
        }
        Ok(())
    }

    /// `http://[user:pass@]host:port`
    pub fn to_url(&self) -> String {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("http://{user}:{pass}@{}:{}", self.host, self.port),
            (Some(user), None) => format!("http://{user}@{}:{}", self.host, self.port),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl std::fmt::Debug for HttpProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProxy")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Connection settings for the default transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Upper bound on a whole request, connect through body read.
    pub timeout: Duration,
    pub proxy: Option<HttpProxy>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            proxy: None,
        }
    }
}
