//! Client for the instant-messaging platform's user REST API.
//!
//! # Overview
//! Registers users and admins, reads and updates profiles and passwords,
//! lists users, admins and a user's groups, deletes users, and manages
//! per-user blacklists. Every operation validates its arguments, builds an
//! `HttpRequest`, hands it to a `Transport`, and returns either the raw
//! `HttpResponse` or a typed result.
//!
//! # Design
//! - `UserApi` is the sans-IO core: `build_*` produces requests, `parse_*`
//!   interprets responses. It is deterministic and testable without a
//!   network.
//! - `UserClient` wires `UserApi` to a `Transport`. The default transport is
//!   `UreqTransport` (feature `ureq`, on by default); tests and embedders can
//!   supply their own.
//! - Configuration is an explicit `ClientConfig` value, never global state.
//! - No retries and no caching: each call is one independent request.
//!
//! ```no_run
//! use jmessage_core::UserClient;
//!
//! # fn main() -> jmessage_core::Result<()> {
//! let client = UserClient::new("your-app-key", "your-master-secret")?;
//! let page = client.get_user_list(0, 50)?;
//! for user in page.users {
//!     println!("{}", user.username);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;
pub mod validate;

pub use api::UserApi;
pub use auth::Credentials;
pub use client::UserClient;
pub use config::{ClientConfig, HttpProxy, TransportConfig};
pub use error::{ApiError, Result, ServerError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RateLimit, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    GroupInfo, RegisterInfo, RegisterPayload, UserGroupsResult, UserInfo, UserListResult, UserPayload,
};
