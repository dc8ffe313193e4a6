//! Application credentials and HTTP Basic authorization.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ApiError, Result};

/// AppKey and master secret identifying one application on the platform.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_key: String,
    master_secret: String,
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, master_secret: impl Into<String>) -> Result<Self> {
        let app_key = app_key.into();
        let master_secret = master_secret.into();
        if app_key.trim().is_empty() {
            return Err(ApiError::invalid("app_key must not be empty"));
        }
        if master_secret.trim().is_empty() {
            return Err(ApiError::invalid("master_secret must not be empty"));
        }
        Ok(Self {
            app_key,
            master_secret,
        })
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Value for the `authorization` header: `Basic base64(app_key:master_secret)`.
    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.app_key, self.master_secret));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("master_secret", &"<redacted>")
            .finish()
    }
}
