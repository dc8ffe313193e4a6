//! User and admin management client.
//!
//! # Design
//! `UserClient` pairs a `UserApi` with a `Transport`. Every operation runs
//! validate, build, execute, parse in that order, so an invalid argument is
//! rejected before the transport is touched. The client holds no mutable
//! state and performs no retries; it is `Send + Sync` whenever its transport
//! is.

use tracing::{debug, warn};

use crate::api::{self, UserApi};
use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{Result, ServerError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{RegisterInfo, RegisterPayload, UserGroupsResult, UserInfo, UserListResult, UserPayload};

#[cfg(feature = "ureq")]
use crate::config::{HttpProxy, TransportConfig};
#[cfg(feature = "ureq")]
use crate::transport::UreqTransport;

/// Typed access to the platform's user and admin endpoints.
#[derive(Debug, Clone)]
pub struct UserClient<T> {
    api: UserApi,
    transport: T,
}

#[cfg(feature = "ureq")]
impl UserClient<UreqTransport> {
    /// Client for the public cloud with default settings and no proxy.
    pub fn new(app_key: &str, master_secret: &str) -> Result<Self> {
        Self::with_config(app_key, master_secret, None, ClientConfig::default())
    }

    /// Client for the public cloud that tunnels through `proxy`.
    pub fn with_proxy(app_key: &str, master_secret: &str, proxy: HttpProxy) -> Result<Self> {
        Self::with_config(app_key, master_secret, Some(proxy), ClientConfig::default())
    }

    /// Client for a private deployment or non-default paths.
    pub fn with_config(
        app_key: &str,
        master_secret: &str,
        proxy: Option<HttpProxy>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = UreqTransport::new(TransportConfig {
            proxy,
            ..TransportConfig::default()
        })?;
        Self::with_transport(Credentials::new(app_key, master_secret)?, config, transport)
    }
}

impl<T: Transport> UserClient<T> {
    pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Result<Self> {
        let api = UserApi::new(&credentials, &config)?;
        debug!(app_key = credentials.app_key(), base_url = %config.base_url, "user client ready");
        Ok(Self { api, transport })
    }

    pub fn api(&self) -> &UserApi {
        &self.api
    }

    pub fn register_users(&self, payload: &RegisterPayload) -> Result<HttpResponse> {
        let request = self.api.build_register_users(payload)?;
        self.send(request)
    }

    pub fn register_admins(&self, payload: &RegisterInfo) -> Result<HttpResponse> {
        let request = self.api.build_register_admins(payload)?;
        self.send(request)
    }

    pub fn get_user_info(&self, username: &str) -> Result<UserInfo> {
        let request = self.api.build_get_user_info(username)?;
        api::parse_user_info(self.exchange(request)?)
    }

    pub fn update_password(&self, username: &str, password: &str) -> Result<HttpResponse> {
        let request = self.api.build_update_password(username, password)?;
        self.send(request)
    }

    pub fn update_user_info(&self, username: &str, payload: &UserPayload) -> Result<HttpResponse> {
        let request = self.api.build_update_user_info(username, payload)?;
        self.send(request)
    }

    /// One page of the appkey's users. `start >= 0`, `0 < count <= 500`.
    pub fn get_user_list(&self, start: i32, count: i32) -> Result<UserListResult> {
        let request = self.api.build_get_user_list(start, count)?;
        api::parse_user_list(self.exchange(request)?)
    }

    /// One page of the appkey's admins. Same bounds as `get_user_list`.
    pub fn get_admin_list_by_appkey(&self, start: i32, count: i32) -> Result<UserListResult> {
        let request = self.api.build_get_admin_list(start, count)?;
        api::parse_user_list(self.exchange(request)?)
    }

    pub fn get_group_list(&self, username: &str) -> Result<UserGroupsResult> {
        let request = self.api.build_get_group_list(username)?;
        api::parse_user_groups(self.exchange(request)?)
    }

    pub fn delete_user(&self, username: &str) -> Result<HttpResponse> {
        let request = self.api.build_delete_user(username)?;
        self.send(request)
    }

    /// Add `users` to `username`'s blacklist, in the given order.
    pub fn add_blacklist<S: AsRef<str>>(&self, username: &str, users: &[S]) -> Result<HttpResponse> {
        let request = self.api.build_add_blacklist(username, users)?;
        self.send(request)
    }

    pub fn remove_blacklist<S: AsRef<str>>(&self, username: &str, users: &[S]) -> Result<HttpResponse> {
        let request = self.api.build_remove_blacklist(username, users)?;
        self.send(request)
    }

    pub fn get_blacklist(&self, username: &str) -> Result<HttpResponse> {
        let request = self.api.build_get_blacklist(username)?;
        self.send(request)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        api::parse_response(self.exchange(request)?)
    }

    fn exchange(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, %url, "sending request");

        let response = self.transport.execute(request)?;
        if response.is_success() {
            debug!(method, %url, status = response.status, "request succeeded");
        } else {
            let code = ServerError::from_body(&response.body).map(|e| e.code);
            warn!(method, %url, status = response.status, ?code, "request rejected by server");
        }
        Ok(response)
    }
}
