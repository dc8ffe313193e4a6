//! In-memory stand-in for the platform's user API.
//!
//! Serves the user, admin, group-membership and blacklist routes with the
//! platform's status codes and error envelope so client code can be
//! exercised end to end without the real service. State lives behind one
//! `RwLock` and is lost when the server stops.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const CODE_USER_EXISTS: i64 = 899001;
pub const CODE_USER_NOT_EXIST: i64 = 899002;
pub const CODE_BAD_PARAMETER: i64 = 899003;
pub const CODE_UNAUTHORIZED: i64 = 899008;

const MAX_PAGE_COUNT: usize = 500;
const CREATED_AT: &str = "2024-01-01 00:00:00";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
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
    pub extras: Option<Map<String, Value>>,
    pub ctime: String,
    pub mtime: String,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: ProfileUpdate,
}

#[derive(Default, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<u8>,
    pub signature: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub extras: Option<Map<String, Value>>,
}

impl ProfileUpdate {
    fn apply(self, user: &mut User) {
        let ProfileUpdate {
            nickname,
            avatar,
            birthday,
            gender,
            signature,
            region,
            address,
            extras,
        } = self;
        user.nickname = nickname.or(user.nickname.take());
        user.avatar = avatar.or(user.avatar.take());
        user.birthday = birthday.or(user.birthday.take());
        user.gender = gender.or(user.gender.take());
        user.signature = signature.or(user.signature.take());
        user.region = region.or(user.region.take());
        user.address = address.or(user.address.take());
        user.extras = extras.or(user.extras.take());
    }
}

#[derive(Deserialize)]
pub struct PasswordUpdate {
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub start: i64,
    pub count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub gid: i64,
    pub name: String,
    pub desc: String,
    #[serde(rename = "MaxMemberCount")]
    pub max_member_count: u32,
}

#[derive(Default)]
pub struct Store {
    users: BTreeMap<String, Account>,
    admins: BTreeMap<String, Account>,
    groups: HashMap<String, Vec<Group>>,
    blacklists: HashMap<String, Vec<String>>,
}

struct Account {
    user: User,
    password: String,
}

impl Account {
    fn new(input: NewUser) -> Self {
        let mut user = User {
            username: input.username,
            ctime: CREATED_AT.to_string(),
            mtime: CREATED_AT.to_string(),
            ..User::default()
        };
        input.profile.apply(&mut user);
        Self {
            user,
            password: input.password,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Store>>,
    authorization: Arc<str>,
}

impl AppState {
    pub fn new(app_key: &str, master_secret: &str) -> Self {
        let token = STANDARD.encode(format!("{app_key}:{master_secret}"));
        Self {
            db: Arc::new(RwLock::new(Store::default())),
            authorization: format!("Basic {token}").into(),
        }
    }

    /// Attach `group` to `username`'s memberships. The platform creates
    /// groups through a separate API this server does not model.
    pub async fn seed_group(&self, username: &str, group: Group) {
        self.db
            .write()
            .await
            .groups
            .entry(username.to_string())
            .or_default()
            .push(group);
    }

    pub async fn password_of(&self, username: &str) -> Option<String> {
        let db = self.db.read().await;
        db.users
            .get(username)
            .or_else(|| db.admins.get(username))
            .map(|account| account.password.clone())
    }
}

/// Platform-shaped failure: `{"error": {"code": .., "message": ..}}`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: i64,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, code: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn user_not_exist(username: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            CODE_USER_NOT_EXIST,
            format!("user {username} not exist"),
        )
    }

    fn bad_parameter(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, CODE_BAD_PARAMETER, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({"error": {"code": self.code, "message": self.message}});
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiFailure>;

pub fn app(app_key: &str, master_secret: &str) -> Router {
    router(AppState::new(app_key, master_secret))
}

/// Router over caller-owned state, for tests that seed data.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/users", get(list_users).post(register_users))
        .route(
            "/v1/users/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/v1/users/{username}/password", put(update_password))
        .route("/v1/users/{username}/groups", get(list_groups))
        .route(
            "/v1/users/{username}/blacklist",
            get(get_blacklist).put(add_blacklist).delete(remove_blacklist),
        )
        .route("/v1/admins", get(list_admins).post(register_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app_key: &str, master_secret: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(app_key, master_secret)).await
}

async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(&*state.authorization) {
        tracing::debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            CODE_UNAUTHORIZED,
            "basic authentication failed",
        )
        .into_response();
    }
    next.run(request).await
}

async fn register_users(
    State(state): State<AppState>,
    Json(input): Json<Vec<NewUser>>,
) -> ApiResult<(StatusCode, Json<Vec<Value>>)> {
    if input.is_empty() {
        return Err(ApiFailure::bad_parameter("user array is empty"));
    }
    let mut db = state.db.write().await;
    let results = input
        .into_iter()
        .map(|new_user| {
            let username = new_user.username.clone();
            if db.users.contains_key(&username) {
                json!({
                    "username": username,
                    "error": {"code": CODE_USER_EXISTS, "message": "user exist"},
                })
            } else {
                db.users.insert(username.clone(), Account::new(new_user));
                json!({"username": username})
            }
        })
        .collect();
    Ok((StatusCode::CREATED, Json(results)))
}

async fn register_admin(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut db = state.db.write().await;
    if db.admins.contains_key(&input.username) {
        return Err(ApiFailure::new(StatusCode::FORBIDDEN, CODE_USER_EXISTS, "user exist"));
    }
    let username = input.username.clone();
    db.admins.insert(username.clone(), Account::new(input));
    Ok((StatusCode::CREATED, Json(json!({"username": username}))))
}

async fn get_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Json<User>> {
    let db = state.db.read().await;
    db.users
        .get(&username)
        .map(|account| Json(account.user.clone()))
        .ok_or_else(|| ApiFailure::user_not_exist(&username))
}

async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<ProfileUpdate>,
) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    let account = db
        .users
        .get_mut(&username)
        .ok_or_else(|| ApiFailure::user_not_exist(&username))?;
    input.apply(&mut account.user);
    Ok(StatusCode::NO_CONTENT)
}

async fn update_password(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<PasswordUpdate>,
) -> ApiResult<StatusCode> {
    if input.new_password.is_empty() {
        return Err(ApiFailure::bad_parameter("new_password is empty"));
    }
    let mut db = state.db.write().await;
    let account = db
        .users
        .get_mut(&username)
        .ok_or_else(|| ApiFailure::user_not_exist(&username))?;
    account.password = input.new_password;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    db.users
        .remove(&username)
        .ok_or_else(|| ApiFailure::user_not_exist(&username))?;
    db.blacklists.remove(&username);
    db.groups.remove(&username);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(State(state): State<AppState>, Query(page): Query<PageQuery>) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    paginate(&db.users, &page).map(Json)
}

async fn list_admins(State(state): State<AppState>, Query(page): Query<PageQuery>) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    paginate(&db.admins, &page).map(Json)
}

fn paginate(accounts: &BTreeMap<String, Account>, page: &PageQuery) -> ApiResult<Value> {
    if page.start < 0 || page.count <= 0 || page.count as usize > MAX_PAGE_COUNT {
        return Err(ApiFailure::bad_parameter("start or count out of range"));
    }
    let users: Vec<&User> = accounts
        .values()
        .skip(page.start as usize)
        .take(page.count as usize)
        .map(|account| &account.user)
        .collect();
    Ok(json!({
        "total": accounts.len(),
        "start": page.start,
        "count": users.len(),
        "users": users,
    }))
}

async fn list_groups(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Json<Vec<Group>>> {
    let db = state.db.read().await;
    if !db.users.contains_key(&username) {
        return Err(ApiFailure::user_not_exist(&username));
    }
    Ok(Json(db.groups.get(&username).cloned().unwrap_or_default()))
}

async fn get_blacklist(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Json<Vec<User>>> {
    let db = state.db.read().await;
    if !db.users.contains_key(&username) {
        return Err(ApiFailure::user_not_exist(&username));
    }
    let blocked = db
        .blacklists
        .get(&username)
        .into_iter()
        .flatten()
        .filter_map(|name| db.users.get(name).map(|account| account.user.clone()))
        .collect();
    Ok(Json(blocked))
}

async fn add_blacklist(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(names): Json<Vec<String>>,
) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    check_blacklist_request(&db, &username, &names)?;
    let list = db.blacklists.entry(username).or_default();
    for name in names {
        if !list.contains(&name) {
            list.push(name);
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_blacklist(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(names): Json<Vec<String>>,
) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    check_blacklist_request(&db, &username, &names)?;
    if let Some(list) = db.blacklists.get_mut(&username) {
        list.retain(|name| !names.contains(name));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn check_blacklist_request(db: &Store, username: &str, names: &[String]) -> ApiResult<()> {
    if !db.users.contains_key(username) {
        return Err(ApiFailure::user_not_exist(username));
    }
    if names.is_empty() {
        return Err(ApiFailure::bad_parameter("black list is empty"));
    }
    match names.iter().find(|name| !db.users.contains_key(name.as_str())) {
        Some(unknown) => Err(ApiFailure::user_not_exist(unknown)),
        None => Ok(()),
    }
}
