// Credential check and the per-session login gate
use crate::model::AuthError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct AuthFile {
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    #[serde(default)]
    usernames: BTreeMap<String, UserEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// bcrypt hash (`$2b$...`).
    pub password: String,
}

/// Pre-hashed users, keyed by lower-cased username.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, UserEntry>,
}

impl CredentialStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses `credentials.usernames.<name>.password` YAML; other top-level
    /// keys are ignored.
    pub fn from_yaml(yaml: &str) -> Result<Self, AuthError> {
        let file: AuthFile = serde_yaml::from_str(yaml).map_err(|e| AuthError::Store(e.to_string()))?;
        let users = file
            .credentials
            .usernames
            .into_iter()
            .map(|(name, entry)| (name.trim().to_lowercase(), entry))
            .collect();
        Ok(Self { users })
    }

    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AuthError::Store(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<&UserEntry, AuthError> {
        let entry = self
            .users
            .get(&username.trim().to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;
        match bcrypt::verify(password, &entry.password) {
            Ok(true) => Ok(entry),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                warn!("Stored hash for '{}' is unusable: {}", username, e);
                Err(AuthError::Store(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub session_id: String,
    pub since: DateTime<Utc>,
}

/// Boolean login gate for one console session.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<AuthenticatedUser>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(
        &mut self,
        store: &CredentialStore,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<&AuthenticatedUser, AuthError> {
        self.user = None;
        let entry = store.verify(username, password).inspect_err(|e| {
            warn!("Login failed for '{}': {}", username, e);
        })?;

        let user = AuthenticatedUser {
            username: username.trim().to_lowercase(),
            display_name: entry.name.clone().unwrap_or_else(|| username.trim().to_string()),
            email: entry.email.clone(),
            session_id: format!("{:016x}", rand::random::<u64>()),
            since: now,
        };
        info!("User '{}' logged in (session {})", user.username, user.session_id);
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) -> Option<AuthenticatedUser> {
        let user = self.user.take();
        if let Some(u) = &user {
            info!("User '{}' logged out (session {})", u.username, u.session_id);
        }
        user
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require(&self) -> Result<&AuthenticatedUser, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        let yaml = format!(
            "credentials:\n  usernames:\n    Analyst:\n      email: analyst@example.edu\n      name: Ana Lyst\n      password: \"{hash}\"\ncookie:\n  name: ignored\n"
        );
        CredentialStore::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn verifies_bcrypt_hash() {
        let store = store();
        assert_eq!(store.len(), 1);
        assert!(store.verify("analyst", "s3cret").is_ok());
        assert!(store.verify("ANALYST ", "s3cret").is_ok());
        assert_eq!(store.verify("analyst", "wrong").unwrap_err(), AuthError::InvalidCredentials);
        assert_eq!(store.verify("nobody", "s3cret").unwrap_err(), AuthError::InvalidCredentials);
    }

    #[test]
    fn malformed_hash_is_a_store_error() {
        let store = CredentialStore::from_yaml(
            "credentials:\n  usernames:\n    viewer:\n      password: not-a-hash\n",
        )
        .unwrap();
        assert!(matches!(store.verify("viewer", "x"), Err(AuthError::Store(_))));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(matches!(CredentialStore::from_yaml("users: ["), Err(AuthError::Store(_))));
    }

    #[test]
    fn session_gate() {
        let store = store();
        let mut session = Session::new();
        assert_eq!(session.require().unwrap_err(), AuthError::NotLoggedIn);

        assert!(session.login(&store, "analyst", "bad", Utc::now()).is_err());
        assert!(!session.is_authenticated());

        let user = session.login(&store, "analyst", "s3cret", Utc::now()).unwrap();
        assert_eq!(user.display_name, "Ana Lyst");
        assert_eq!(user.email.as_deref(), Some("analyst@example.edu"));
        assert_eq!(user.session_id.len(), 16);
        assert!(session.is_authenticated());

        assert!(session.logout().is_some());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn failed_login_drops_previous_session() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "analyst", "s3cret", Utc::now()).unwrap();
        assert!(session.login(&store, "analyst", "bad", Utc::now()).is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn empty_store_rejects_everyone() {
        let mut session = Session::new();
        assert!(session.login(&CredentialStore::empty(), "analyst", "x", Utc::now()).is_err());
    }
}
