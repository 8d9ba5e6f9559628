use std::path::Path;

use chrono::Utc;
use sha2::{Digest as _, Sha256};
use std::fmt::Write as _;
use uuid::Uuid;

use crate::io::store_io::{self, StoreError};
use crate::model::user::{Session, UserRecord};

const MIN_PASSWORD_LEN: usize = 6;

/// Error type for the account layer. Validation variants map to the
/// user-facing messages; store failures bubble through.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username is required")]
    UsernameRequired,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("please fill in all fields")]
    MissingFields,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create an account and log it in. Passwords are stored as a salted
/// sha256 digest; the plaintext is never persisted and cannot be
/// recovered from the store.
pub fn register(
    dir: &Path,
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<Session, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::UsernameRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    if password != confirm {
        return Err(AuthError::PasswordMismatch);
    }

    let mut users = store_io::read_users(dir).into_users();
    if users.contains_key(username) {
        return Err(AuthError::UsernameTaken(username.to_string()));
    }

    let salt = Uuid::new_v4().simple().to_string();
    let record = UserRecord {
        username: username.to_string(),
        email: email.trim().to_string(),
        password_hash: hash_password(&salt, password),
        salt,
        created_at: Utc::now(),
        todos: Vec::new(),
    };
    users.insert(username.to_string(), record);
    store_io::write_users(dir, &users)?;

    let session = Session {
        username: username.to_string(),
        email: email.trim().to_string(),
    };
    store_io::write_session(dir, &session)?;
    Ok(session)
}

/// Verify credentials and persist the session.
pub fn login(dir: &Path, username: &str, password: &str) -> Result<Session, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let users = store_io::read_users(dir).into_users();
    let record = users
        .get(username)
        .ok_or(AuthError::InvalidCredentials)?;
    if hash_password(&record.salt, password) != record.password_hash {
        return Err(AuthError::InvalidCredentials);
    }

    let session = Session {
        username: record.username.clone(),
        email: record.email.clone(),
    };
    store_io::write_session(dir, &session)?;
    Ok(session)
}

/// End the session. Task data stays in the store untouched.
pub fn logout(dir: &Path) -> Result<(), StoreError> {
    store_io::clear_session(dir)
}

/// The session persisted by the last register/login, if any.
pub fn current_session(dir: &Path) -> Option<Session> {
    store_io::read_session(dir)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
