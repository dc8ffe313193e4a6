//! Client-side argument checks.
//!
//! Every check runs before a request is built, so a rejected argument never
//! reaches the transport.

use crate::error::{ApiError, Result};

/// Largest page the platform serves for user and admin listings.
pub const MAX_PAGE_COUNT: i32 = 500;

const MIN_LEN: usize = 4;
const MAX_LEN: usize = 128;

/// Usernames are 4..=128 bytes, start with an ASCII letter or digit, and
/// otherwise contain only ASCII letters, digits, `_`, `-`, `.` or `@`.
pub fn check_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(ApiError::invalid("username must not be empty"));
    }
    if username.contains(['\n', '\r', '\t']) {
        return Err(ApiError::invalid(
            "username must not contain line feed or tab characters",
        ));
    }
    if !(MIN_LEN..=MAX_LEN).contains(&username.len()) {
        return Err(ApiError::invalid(format!(
            "username must be between {MIN_LEN} and {MAX_LEN} bytes, got {:?}",
            username
        )));
    }
    let mut chars = username.chars();
    let leading_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    if !leading_ok || !chars.all(is_username_char) {
        return Err(ApiError::invalid(format!(
            "username {username:?} contains illegal characters, a-zA-Z0-9 _ - . @ are allowed \
             and it must start with a letter or digit"
        )));
    }
    Ok(())
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@')
}

/// Passwords are non-blank and 4..=128 bytes. The value is never echoed in
/// the error.
pub fn check_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(ApiError::invalid("password must not be empty"));
    }
    if !(MIN_LEN..=MAX_LEN).contains(&password.len()) {
        return Err(ApiError::invalid(format!(
            "password must be between {MIN_LEN} and {MAX_LEN} bytes, got {}",
            password.len()
        )));
    }
    Ok(())
}

pub fn check_page(start: i32, count: i32) -> Result<()> {
    if start < 0 || count <= 0 || count > MAX_PAGE_COUNT {
        return Err(ApiError::invalid(format!(
            "start must be non-negative and count must be in 1..={MAX_PAGE_COUNT}, \
             got start={start} count={count}"
        )));
    }
    Ok(())
}
