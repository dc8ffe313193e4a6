//! Domain DTOs for the user API.
//!
//! # Design
//! Request payloads serialize only the fields that are set, so a partial
//! profile update never clobbers fields the caller left alone. Result types
//! are read-only views built by deserializing a response body; unknown
//! fields are ignored and absent optional fields stay `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::validate::{check_password, check_username};

/// Most users a single registration request may carry.
pub const MAX_REGISTER_BATCH: usize = 500;

/// One user or admin to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// `yyyy-MM-dd HH:mm:ss`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// 0 unknown, 1 male, 2 female.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

impl RegisterInfo {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_username(&self.username)?;
        check_password(&self.password)
    }
}

/// A batch of users to register, sent as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterPayload {
    pub users: Vec<RegisterInfo>,
}

impl RegisterPayload {
    pub fn new(users: Vec<RegisterInfo>) -> Self {
        Self { users }
    }

    pub fn push(&mut self, info: RegisterInfo) -> &mut Self {
        self.users.push(info);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.users.is_empty() {
            return Err(ApiError::invalid("register payload must not be empty"));
        }
        if self.users.len() > MAX_REGISTER_BATCH {
            return Err(ApiError::invalid(format!(
                "register payload holds {} users, at most {MAX_REGISTER_BATCH} allowed",
                self.users.len()
            )));
        }
        self.users.iter().try_for_each(RegisterInfo::validate)
    }
}

/// Profile fields to change. Only the fields present in the JSON are applied;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

impl UserPayload {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user or admin as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

/// One page of a user or admin listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserListResult {
    pub total: u64,
    pub start: u64,
    pub count: u64,
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

/// A group a user belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub gid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appkey: Option<String>,
    #[serde(rename = "MaxMemberCount", default, skip_serializing_if = "Option::is_none")]
    pub max_member_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
}

/// Every group a user belongs to, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserGroupsResult {
    pub groups: Vec<GroupInfo>,
}

#[derive(Serialize)]
pub(crate) struct PasswordUpdate<'a> {
    pub new_password: &'a str,
}
