//! Runtime configuration read from the environment.

use std::collections::BTreeMap;
use std::env;

use anyhow::{Context, Result};

use crate::credential::CredentialStore;

pub const KEY_VAR: &str = "WXREAD_KEY";
pub const COOKIES_VAR: &str = "WXREAD_COOKIES";
pub const HEADERS_VAR: &str = "WXREAD_HEADERS";
pub const READ_NUM_VAR: &str = "WXREAD_READ_NUM";
pub const PUSH_METHOD_VAR: &str = "WXREAD_PUSH_METHOD";

#[derive(Debug, Clone)]
pub struct Config {
    /// Opaque session key sent as `key` in every read request.
    pub key: String,
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub read_num: u32,
    /// Notification channel; `None` disables notification.
    pub push_method: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is not set", name))
        };

        let key = required(KEY_VAR)?;

        let cookies: BTreeMap<String, String> = serde_json::from_str(&required(COOKIES_VAR)?)
            .with_context(|| format!("{} must be a JSON object of strings", COOKIES_VAR))?;

        let headers: BTreeMap<String, String> = serde_json::from_str(&required(HEADERS_VAR)?)
            .with_context(|| format!("{} must be a JSON object of strings", HEADERS_VAR))?;

        let read_num: u32 = required(READ_NUM_VAR)?
            .trim()
            .parse()
            .with_context(|| format!("{} must be a positive integer", READ_NUM_VAR))?;
        anyhow::ensure!(read_num > 0, "{} must be a positive integer", READ_NUM_VAR);

        let push_method = lookup(PUSH_METHOD_VAR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        Ok(Self {
            key,
            cookies,
            headers,
            read_num,
            push_method,
        })
    }

    pub fn credential_store(&self) -> Result<CredentialStore> {
        CredentialStore::new(self.cookies.clone(), self.headers.clone())
            .with_context(|| format!("invalid {}", COOKIES_VAR))
    }
}
