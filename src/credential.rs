//! Session credential: the cookie jar and static headers sent with every request.

use std::collections::BTreeMap;

use anyhow::Result;

/// Name of the cookie that authenticates the session.
pub const SESSION_COOKIE: &str = "wr_skey";

/// Cookies and headers attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl Credential {
    /// Value for a `Cookie` request header (`name=value; name=value`).
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn session_key(&self) -> Option<&str> {
        self.cookies.get(SESSION_COOKIE).map(String::as_str)
    }
}

/// Owner of the run's [`Credential`].
///
/// The only mutation is [`replace_session_key`](Self::replace_session_key),
/// which swaps the `wr_skey` cookie and leaves everything else as it was.
#[derive(Debug)]
pub struct CredentialStore {
    credential: Credential,
}

impl CredentialStore {
    /// Fails if `cookies` has no `wr_skey` entry.
    pub fn new(
        cookies: BTreeMap<String, String>,
        headers: BTreeMap<String, String>,
    ) -> Result<Self> {
        anyhow::ensure!(
            cookies.contains_key(SESSION_COOKIE),
            "cookies must contain a {} entry",
            SESSION_COOKIE
        );
        Ok(Self {
            credential: Credential { cookies, headers },
        })
    }

    pub fn get(&self) -> &Credential {
        &self.credential
    }

    pub fn replace_session_key(&mut self, new_key: impl Into<String>) {
        self.credential
            .cookies
            .insert(SESSION_COOKIE.to_string(), new_key.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("wr_vid".to_string(), "123456".to_string()),
            ("wr_skey".to_string(), "oldkey00".to_string()),
        ])
    }

    fn headers() -> BTreeMap<String, String> {
        BTreeMap::from([("user-agent".to_string(), "Mozilla/5.0".to_string())])
    }

    #[test]
    fn test_requires_session_cookie() {
        let mut cookies = cookies();
        cookies.remove(SESSION_COOKIE);
        assert!(CredentialStore::new(cookies, headers()).is_err());
    }

    #[test]
    fn test_replace_session_key_touches_only_session_cookie() {
        let mut store = CredentialStore::new(cookies(), headers()).unwrap();
        store.replace_session_key("newkey01");

        let credential = store.get();
        assert_eq!(credential.session_key(), Some("newkey01"));
        assert_eq!(credential.cookies.get("wr_vid").map(String::as_str), Some("123456"));
        assert_eq!(credential.cookies.len(), 2);
        assert_eq!(credential.headers, headers());
    }

    #[test]
    fn test_cookie_header() {
        let store = CredentialStore::new(cookies(), headers()).unwrap();
        assert_eq!(store.get().cookie_header(), "wr_skey=oldkey00; wr_vid=123456");
    }
}
