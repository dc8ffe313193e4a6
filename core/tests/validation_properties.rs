//! Property-based tests for argument validation and request shaping.

use std::sync::atomic::{AtomicUsize, Ordering};

use jmessage_core::{
    ApiError, ClientConfig, Credentials, HttpRequest, HttpResponse, Result, Transport, UserClient, UserPayload,
};
use proptest::prelude::*;

/// Counts calls and answers every request with an empty 200.
#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

impl Transport for CountingTransport {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        })
    }
}

fn client(transport: &CountingTransport) -> UserClient<&CountingTransport> {
    UserClient::with_transport(
        Credentials::new("appkey", "secret").unwrap(),
        ClientConfig::default().with_base_url("http://im.test"),
        transport,
    )
    .unwrap()
}

/// Usernames that break at least one rule: too short, too long, bad leading
/// character, illegal character, or blank.
fn invalid_username() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]{0,3}",
        "[a-z0-9]{129,140}",
        "[_.@-][a-z0-9]{3,10}",
        "[a-z][a-z0-9]{2,8}[ #/!%&*()+=?]",
        "[ \t\n]{1,6}",
    ]
}

fn valid_username() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.@-]{3,40}"
}

/// Property: every username-taking operation rejects an invalid username
/// without touching the transport.
#[test]
fn prop_invalid_username_never_reaches_transport() {
    proptest!(|(username in invalid_username())| {
        let transport = CountingTransport::default();
        let c = client(&transport);
        let payload = UserPayload { nickname: Some("n".to_string()), ..UserPayload::default() };

        let results = [
            c.get_user_info(&username).map(|_| ()),
            c.update_password(&username, "secret").map(|_| ()),
            c.update_user_info(&username, &payload).map(|_| ()),
            c.get_group_list(&username).map(|_| ()),
            c.delete_user(&username).map(|_| ()),
            c.add_blacklist(&username, &["bob0001"]).map(|_| ()),
            c.remove_blacklist(&username, &["bob0001"]).map(|_| ()),
            c.get_blacklist(&username).map(|_| ()),
        ];
        for result in results {
            prop_assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
        }
        prop_assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    });
}

/// Property: out-of-range paging is rejected before any request.
#[test]
fn prop_out_of_range_paging_is_rejected() {
    let bad_page = prop_oneof![
        (i32::MIN..0, 1..=500i32),
        (0..10_000i32, i32::MIN..=0),
        (0..10_000i32, 501..=i32::MAX),
    ];
    proptest!(|((start, count) in bad_page)| {
        let api = client(&CountingTransport::default()).api().clone();
        prop_assert!(matches!(api.build_get_user_list(start, count), Err(ApiError::InvalidArgument(_))));
        prop_assert!(matches!(api.build_get_admin_list(start, count), Err(ApiError::InvalidArgument(_))));
    });
}

/// Property: in-range paging produces exactly `?start={start}&count={count}`.
#[test]
fn prop_valid_paging_builds_exact_query() {
    proptest!(|(start in 0..i32::MAX, count in 1..=500i32)| {
        let transport = CountingTransport::default();
        let api = client(&transport).api().clone();
        let users = api.build_get_user_list(start, count).unwrap();
        let admins = api.build_get_admin_list(start, count).unwrap();
        prop_assert_eq!(users.url, format!("http://im.test/v1/users?start={start}&count={count}"));
        prop_assert_eq!(admins.url, format!("http://im.test/v1/admins?start={start}&count={count}"));
    });
}

/// Property: blacklist bodies are exactly the given usernames, in order.
#[test]
fn prop_blacklist_body_preserves_order() {
    proptest!(|(owner in valid_username(), users in prop::collection::vec(valid_username(), 1..20))| {
        let transport = CountingTransport::default();
        let api = client(&transport).api().clone();
        for req in [api.build_add_blacklist(&owner, users.as_slice()).unwrap(), api.build_remove_blacklist(&owner, users.as_slice()).unwrap()] {
            let body: Vec<String> = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            prop_assert_eq!(&body, &users);
        }
    });
}

/// Property: the password body is exactly `{"new_password": <password>}`.
#[test]
fn prop_password_body_is_exact() {
    proptest!(|(username in valid_username(), password in "[a-zA-Z0-9!#$%&*+-]{4,64}")| {
        let transport = CountingTransport::default();
        let api = client(&transport).api().clone();
        let req = api.build_update_password(&username, &password).unwrap();
        let expected = serde_json::json!({ "new_password": password });
        let expected = expected.to_string();
        prop_assert_eq!(req.body.as_deref(), Some(expected.as_str()));
    });
}
