//! GitLab token storage in the system keychain.

use keyring::Entry;
use serde::Serialize;
use std::env;

use crate::error::{Error, Result};

const SERVICE_NAME: &str = "addon-release";
const TOKEN_KEY: &str = "gitlab:token";
pub const TOKEN_ENV: &str = "GITLAB_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Flag,
    Environment,
    Keychain,
}

fn keyring_error(e: keyring::Error) -> Error {
    Error::internal_unexpected(format!("Keychain error: {}", e))
}

fn entry() -> Result<Entry> {
    Entry::new(SERVICE_NAME, TOKEN_KEY).map_err(keyring_error)
}

pub fn store_token(token: &str) -> Result<()> {
    entry()?.set_password(token).map_err(keyring_error)
}

/// Returns `None` if no token has been stored.
pub fn get_token() -> Result<Option<String>> {
    match entry()?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(keyring_error(e)),
    }
}

pub fn delete_token() -> Result<()> {
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Resolve the token: explicit flag, then `GITLAB_TOKEN`, then the keychain.
pub fn resolve_token(flag: Option<&str>) -> Result<Option<(String, TokenSource)>> {
    let env_value = env::var(TOKEN_ENV).ok();
    if let Some(found) = pick_token(flag, env_value.as_deref()) {
        return Ok(Some(found));
    }
    Ok(get_token()?.map(|token| (token, TokenSource::Keychain)))
}

fn pick_token(flag: Option<&str>, env_value: Option<&str>) -> Option<(String, TokenSource)> {
    let non_empty = |v: &&str| !v.trim().is_empty();
    flag.filter(non_empty)
        .map(|t| (t.to_string(), TokenSource::Flag))
        .or_else(|| {
            env_value
                .filter(non_empty)
                .map(|t| (t.to_string(), TokenSource::Environment))
        })
}
