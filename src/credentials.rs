//! Docker credential file handling
//!
//! Loads a Docker-style `config.json` and precomputes the basic
//! `Authorization` header value for each registry host. The store is built
//! once and never mutated afterwards; lookups are by the URL authority
//! exactly as it appears in the request (`host` or `host:port`).

use crate::error::{RegistryError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One entry under `auths` in a Docker config file.
///
/// Unknown fields (`identitytoken`, `email`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthEntry {
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl AuthEntry {
    /// The `Authorization` header value for this entry, when usable.
    ///
    /// A pre-encoded `auth` field is used verbatim; otherwise username and
    /// password (both required) are base64-composed. Entries with neither
    /// yield nothing and are dropped from the store.
    fn header_value(&self) -> Option<String> {
        if !self.auth.is_empty() {
            Some(format!("Basic {}", self.auth))
        } else if !self.username.is_empty() && !self.password.is_empty() {
            let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
            Some(format!("Basic {}", encoded))
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

/// Immutable map from registry host to a pre-encoded `Basic` credential.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    /// A store with no credentials (anonymous access everywhere).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load credentials from a Docker-style config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: DockerConfigFile = serde_json::from_str(&raw).map_err(|e| {
            RegistryError::decode(format!("credential file '{}'", path.display()), e)
        })?;
        Ok(Self::from_entries(config.auths))
    }

    /// Load from the conventional location: `$DOCKER_CONFIG/config.json`,
    /// falling back to `$HOME/.docker/config.json`. A missing file yields an
    /// empty store rather than an error.
    pub fn from_default_location() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::empty()),
        }
    }

    fn default_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
            if !dir.is_empty() {
                return Some(PathBuf::from(dir).join("config.json"));
            }
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".docker").join("config.json"))
    }

    fn from_entries(entries: HashMap<String, AuthEntry>) -> Self {
        let mut credentials = HashMap::new();
        for (host, entry) in entries {
            if let Some(value) = entry.header_value() {
                credentials.insert(host, value);
            }
        }
        Self { credentials }
    }

    /// Add a credential for one host from a username/password pair.
    pub fn with_password(
        mut self,
        host: impl Into<String>,
        username: &str,
        password: &str,
    ) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        self.credentials
            .insert(host.into(), format!("Basic {}", encoded));
        self
    }

    /// The pre-encoded authorization value for a registry host, if any.
    pub fn lookup(&self, host: &str) -> Option<&str> {
        self.credentials.get(host).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preencoded_auth_wins_over_password() {
        let entry = AuthEntry {
            auth: "cHJlOmVuY29kZWQ=".to_string(),
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(
            entry.header_value(),
            Some("Basic cHJlOmVuY29kZWQ=".to_string())
        );
    }

    #[test]
    fn test_username_password_composition() {
        let entry = AuthEntry {
            auth: String::new(),
            username: "testuser".to_string(),
            password: "testpass".to_string(),
        };
        let expected = format!("Basic {}", STANDARD.encode("testuser:testpass"));
        assert_eq!(entry.header_value(), Some(expected));
    }

    #[test]
    fn test_incomplete_entries_yield_nothing() {
        let no_password = AuthEntry {
            username: "user".to_string(),
            ..Default::default()
        };
        assert_eq!(no_password.header_value(), None);

        let no_username = AuthEntry {
            password: "pass".to_string(),
            ..Default::default()
        };
        assert_eq!(no_username.header_value(), None);

        assert_eq!(AuthEntry::default().header_value(), None);
    }

    #[test]
    fn test_config_file_parsing() {
        let json = r#"{
            "auths": {
                "registry.example.com": {"auth": "dXNlcjpwYXNz"},
                "registry.example.com:5000": {"username": "admin", "password": "secret"},
                "empty.example.com": {}
            }
        }"#;
        let config: DockerConfigFile = serde_json::from_str(json).unwrap();
        let store = CredentialStore::from_entries(config.auths);

        assert_eq!(
            store.lookup("registry.example.com"),
            Some("Basic dXNlcjpwYXNz")
        );
        let composed = format!("Basic {}", STANDARD.encode("admin:secret"));
        assert_eq!(
            store.lookup("registry.example.com:5000"),
            Some(composed.as_str())
        );
        assert_eq!(store.lookup("empty.example.com"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{
            "auths": {
                "registry.example.com": {
                    "auth": "dXNlcjpwYXNz",
                    "email": "user@example.com",
                    "identitytoken": "tok"
                }
            },
            "credsStore": "desktop"
        }"#;
        let config: DockerConfigFile = serde_json::from_str(json).unwrap();
        let store = CredentialStore::from_entries(config.auths);
        assert_eq!(
            store.lookup("registry.example.com"),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[test]
    fn test_lookup_miss() {
        let store = CredentialStore::empty();
        assert_eq!(store.lookup("registry.example.com"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_with_password_builder() {
        let store = CredentialStore::empty().with_password("localhost:5000", "user", "pw");
        let expected = format!("Basic {}", STANDARD.encode("user:pw"));
        assert_eq!(store.lookup("localhost:5000"), Some(expected.as_str()));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = CredentialStore::from_file("/no/such/dir/config.json").unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }

    #[test]
    fn test_from_file_corrupt_json_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "rubbish").unwrap();

        let err = CredentialStore::from_file(&path).unwrap_err();
        match err {
            RegistryError::Decode { context, .. } => assert!(context.contains("config.json")),
            other => panic!("expected Decode, got {:?}", other),
        }
    }
}
