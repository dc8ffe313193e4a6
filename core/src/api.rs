//! Stateless HTTP request builder and response parser for the user API.
//!
//! # Design
//! `UserApi` holds only credentials and normalized paths, and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that validates its arguments and produces an `HttpRequest`, and a
//! `parse_*` function that consumes an `HttpResponse`. Nothing here performs
//! I/O; `UserClient` wires the two halves to a `Transport`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result, ServerError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    PasswordUpdate, RegisterInfo, RegisterPayload, UserGroupsResult, UserInfo, UserListResult,
    UserPayload,
};
use crate::validate::{check_page, check_password, check_username};

/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Clone)]
pub struct UserApi {
    authorization: String,
    users_url: String,
    admins_url: String,
}

impl fmt::Debug for UserApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserApi")
            .field("users_url", &self.users_url)
            .field("admins_url", &self.admins_url)
            .finish_non_exhaustive()
    }
}

impl UserApi {
    pub fn new(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        let config = config.normalized()?;
        Ok(Self {
            authorization: credentials.authorization_header(),
            users_url: format!("{}{}", config.base_url, config.user_path),
            admins_url: format!("{}{}", config.base_url, config.admin_path),
        })
    }

    pub fn build_register_users(&self, payload: &RegisterPayload) -> Result<HttpRequest> {
        payload.validate()?;
        self.json_request(HttpMethod::Post, self.users_url.clone(), payload)
    }

    pub fn build_register_admins(&self, payload: &RegisterInfo) -> Result<HttpRequest> {
        payload.validate()?;
        self.json_request(HttpMethod::Post, self.admins_url.clone(), payload)
    }

    pub fn build_get_user_info(&self, username: &str) -> Result<HttpRequest> {
        check_username(username)?;
        Ok(self.request(HttpMethod::Get, self.user_url(username)))
    }

    pub fn build_update_password(&self, username: &str, password: &str) -> Result<HttpRequest> {
        check_username(username)?;
        check_password(password)?;
        self.json_request(
            HttpMethod::Put,
            format!("{}/password", self.user_url(username)),
            &PasswordUpdate {
                new_password: password,
            },
        )
    }

    pub fn build_update_user_info(&self, username: &str, payload: &UserPayload) -> Result<HttpRequest> {
        check_username(username)?;
        if payload.is_empty() {
            return Err(ApiError::invalid("user payload must set at least one field"));
        }
        self.json_request(HttpMethod::Put, self.user_url(username), payload)
    }

    pub fn build_get_user_list(&self, start: i32, count: i32) -> Result<HttpRequest> {
        check_page(start, count)?;
        Ok(self.request(
            HttpMethod::Get,
            format!("{}?start={start}&count={count}", self.users_url),
        ))
    }

    pub fn build_get_admin_list(&self, start: i32, count: i32) -> Result<HttpRequest> {
        check_page(start, count)?;
        Ok(self.request(
            HttpMethod::Get,
            format!("{}?start={start}&count={count}", self.admins_url),
        ))
    }

    pub fn build_get_group_list(&self, username: &str) -> Result<HttpRequest> {
        check_username(username)?;
        Ok(self.request(HttpMethod::Get, format!("{}/groups", self.user_url(username))))
    }

    pub fn build_delete_user(&self, username: &str) -> Result<HttpRequest> {
        check_username(username)?;
        Ok(self.request(HttpMethod::Delete, self.user_url(username)))
    }

    pub fn build_add_blacklist<S: AsRef<str>>(&self, username: &str, users: &[S]) -> Result<HttpRequest> {
        self.blacklist_request(HttpMethod::Put, username, users)
    }

    pub fn build_remove_blacklist<S: AsRef<str>>(&self, username: &str, users: &[S]) -> Result<HttpRequest> {
        self.blacklist_request(HttpMethod::Delete, username, users)
    }

    pub fn build_get_blacklist(&self, username: &str) -> Result<HttpRequest> {
        check_username(username)?;
        Ok(self.request(HttpMethod::Get, self.blacklist_url(username)))
    }

    fn blacklist_request<S: AsRef<str>>(
        &self,
        method: HttpMethod,
        username: &str,
        users: &[S],
    ) -> Result<HttpRequest> {
        check_username(username)?;
        if users.is_empty() {
            return Err(ApiError::invalid("black list should not be empty"));
        }
        let users: Vec<&str> = users.iter().map(AsRef::as_ref).collect();
        self.json_request(method, self.blacklist_url(username), &users)
    }

    fn user_url(&self, username: &str) -> String {
        format!("{}/{username}", self.users_url)
    }

    fn blacklist_url(&self, username: &str) -> String {
        format!("{}/blacklist", self.user_url(username))
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![("authorization".to_string(), self.authorization.clone())],
            body: None,
        }
    }

    fn json_request<B: Serialize + ?Sized>(&self, method: HttpMethod, url: String, body: &B) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.request(method, url);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

/// Pass 2xx responses through untouched; anything else becomes
/// `ApiError::RequestFailed`.
pub fn parse_response(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::RequestFailed {
        status: response.status,
        error: ServerError::from_body(&response.body),
        body: response.body,
    })
}

pub fn parse_user_info(response: HttpResponse) -> Result<UserInfo> {
    parse_json(response)
}

pub fn parse_user_list(response: HttpResponse) -> Result<UserListResult> {
    parse_json(response)
}

pub fn parse_user_groups(response: HttpResponse) -> Result<UserGroupsResult> {
    parse_json(response)
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let response = parse_response(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: &str = "Basic YXBwa2V5OnNlY3JldA==";

    fn api() -> UserApi {
        let credentials = Credentials::new("appkey", "secret").unwrap();
        let config = ClientConfig::default().with_base_url("http://localhost:3000");
        UserApi::new(&credentials, &config).unwrap()
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_register_users_produces_correct_request() {
        let payload = RegisterPayload::new(vec![
            RegisterInfo::new("alice01", "secret"),
            RegisterInfo {
                nickname: Some("Bob".to_string()),
                ..RegisterInfo::new("bob0001", "secret")
            },
        ]);
        let req = api().build_register_users(&payload).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v1/users");
        assert_eq!(
            req.headers,
            vec![
                ("authorization".to_string(), AUTH.to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ]
        );
        let body = body_json(&req);
        assert_eq!(body[0]["username"], "alice01");
        assert_eq!(body[1]["nickname"], "Bob");
        assert!(body[0].get("nickname").is_none());
    }

    #[test]
    fn build_register_admins_posts_single_object() {
        let req = api().build_register_admins(&RegisterInfo::new("admin01", "secret")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v1/admins");
        assert_eq!(body_json(&req), serde_json::json!({"username": "admin01", "password": "secret"}));
    }

    #[test]
    fn build_register_rejects_empty_payload() {
        let err = api().build_register_users(&RegisterPayload::default()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn build_get_user_info_produces_correct_request() {
        let req = api().build_get_user_info("alice01").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01");
        assert_eq!(req.header("authorization"), Some(AUTH));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_update_password_body_is_exact() {
        let req = api().build_update_password("alice01", "n3wpass").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01/password");
        assert_eq!(req.body.as_deref(), Some(r#"{"new_password":"n3wpass"}"#));
    }

    #[test]
    fn build_update_password_rejects_bad_password() {
        assert!(matches!(
            api().build_update_password("alice01", ""),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn build_update_user_info_sends_only_set_fields() {
        let payload = UserPayload {
            nickname: Some("Alice".to_string()),
            ..UserPayload::default()
        };
        let req = api().build_update_user_info("alice01", &payload).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01");
        assert_eq!(body_json(&req), serde_json::json!({"nickname": "Alice"}));
    }

    #[test]
    fn build_update_user_info_rejects_empty_payload() {
        let err = api()
            .build_update_user_info("alice01", &UserPayload::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn build_list_requests_carry_exact_query() {
        let req = api().build_get_user_list(0, 500).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/users?start=0&count=500");
        let req = api().build_get_admin_list(20, 10).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/admins?start=20&count=10");
        assert_eq!(req.method, HttpMethod::Get);
    }

    #[test]
    fn build_list_requests_reject_bad_bounds() {
        for (start, count) in [(-1, 10), (0, 0), (0, -1), (0, 501)] {
            assert!(api().build_get_user_list(start, count).is_err(), "{start},{count}");
            assert!(api().build_get_admin_list(start, count).is_err(), "{start},{count}");
        }
    }

    #[test]
    fn build_group_and_delete_requests() {
        let req = api().build_get_group_list("alice01").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01/groups");

        let req = api().build_delete_user("alice01").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_blacklist_requests_preserve_order() {
        let req = api().build_add_blacklist("alice01", &["zed0001", "bob0001", "zed0001"]).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/v1/users/alice01/blacklist");
        assert_eq!(req.body.as_deref(), Some(r#"["zed0001","bob0001","zed0001"]"#));

        let users = vec!["bob0001".to_string()];
        let req = api().build_remove_blacklist("alice01", &users[..]).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.body.as_deref(), Some(r#"["bob0001"]"#));

        let req = api().build_get_blacklist("alice01").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn build_blacklist_rejects_empty_list() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            api().build_add_blacklist("alice01", &empty),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            api().build_remove_blacklist("alice01", &empty),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn custom_paths_are_respected() {
        let credentials = Credentials::new("appkey", "secret").unwrap();
        let config = ClientConfig::default()
            .with_base_url("https://im.example.com/")
            .with_user_path("v2/members")
            .with_admin_path("/v2/operators/");
        let api = UserApi::new(&credentials, &config).unwrap();
        assert_eq!(
            api.build_get_user_info("alice01").unwrap().url,
            "https://im.example.com/v2/members/alice01"
        );
        assert_eq!(
            api.build_get_admin_list(0, 1).unwrap().url,
            "https://im.example.com/v2/operators?start=0&count=1"
        );
    }

    #[test]
    fn parse_response_passes_success_through() {
        let resp = parse_response(response(204, "")).unwrap();
        assert_eq!(resp.status, 204);
    }

    #[test]
    fn parse_response_decodes_platform_error() {
        let err = parse_response(response(
            403,
            r#"{"error":{"code":899001,"message":"user exist"}}"#,
        ))
        .unwrap_err();
        match err {
            ApiError::RequestFailed { status, error, body } => {
                assert_eq!(status, 403);
                assert_eq!(error.unwrap().code, 899001);
                assert!(body.contains("user exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_response_keeps_unstructured_body() {
        let err = parse_response(response(502, "bad gateway")).unwrap_err();
        assert!(matches!(
            err,
            ApiError::RequestFailed { status: 502, error: None, ref body } if body == "bad gateway"
        ));
    }

    #[test]
    fn parse_user_info_success() {
        let info = parse_user_info(response(
            200,
            r#"{"username":"alice01","nickname":"Alice","gender":2,"ctime":"2015-06-23 15:41:23"}"#,
        ))
        .unwrap();
        assert_eq!(info.username, "alice01");
        assert_eq!(info.nickname.as_deref(), Some("Alice"));
        assert_eq!(info.gender, Some(2));
    }

    #[test]
    fn parse_user_info_not_found() {
        let err = parse_user_info(response(
            404,
            r#"{"error":{"code":899002,"message":"user not exist"}}"#,
        ))
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.server_code(), Some(899002));
    }

    #[test]
    fn parse_user_list_bad_json() {
        let err = parse_user_list(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_user_groups_success() {
        let groups = parse_user_groups(response(
            200,
            r#"[{"gid":1,"name":"a","desc":""},{"gid":2,"name":"b","desc":"second"}]"#,
        ))
        .unwrap();
        let gids: Vec<i64> = groups.groups.iter().map(|g| g.gid).collect();
        assert_eq!(gids, vec![1, 2]);
    }
}
