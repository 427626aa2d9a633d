//! Authentication collaborator
//!
//! Password sign-in against the backend's auth endpoint, with the
//! session persisted under the data dir so a CLI invocation stays
//! signed in. The data layer itself never touches auth; consumers use
//! the session's access token to build an authenticated
//! [`RestStore`](crate::remote::RestStore).

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AuthError;

/// Table holding the reviewer accounts
const ADMIN_TABLE: &str = "admin_users";

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session's token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| at <= Utc::now())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    email: String,
}

/// Client for the auth endpoint
pub struct AuthClient {
    http: Client,
    base_url: String,
    api_key: String,
    session_path: PathBuf,
    session_tx: watch::Sender<Option<Session>>,
    session_rx: watch::Receiver<Option<Session>>,
}

impl AuthClient {
    /// Build a client; a previously persisted, unexpired session is
    /// restored
    pub fn new(config: &Config) -> Self {
        let session_path = config.session_file_path();
        let initial = load_persisted(&session_path);
        let (session_tx, session_rx) = watch::channel(initial);

        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            session_path,
            session_tx,
            session_rx,
        }
    }

    /// Sign in with email and password
    ///
    /// On success the session is persisted, published to subscribers,
    /// and the reviewer's `last_login` is stamped (best-effort).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AuthError::InvalidCredentials(message));
        }

        let token: TokenResponse = resp.json().await?;
        let session = Session {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email,
            expires_at: token
                .expires_at
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        };

        info!(email = %session.email, "Signed in");
        self.persist(Some(&session))?;
        let _ = self.session_tx.send(Some(session.clone()));

        if let Err(e) = self.touch_last_login(&session).await {
            warn!("Failed to update last_login: {}", e);
        }

        Ok(session)
    }

    /// Sign out, revoking the token and clearing the persisted session
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.session() {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let resp = self
                .http
                .post(&url)
                .header("apikey", &self.api_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            // A failed revoke still clears local state
            if let Err(e) = resp {
                warn!("Token revoke failed: {}", e);
            }
        }

        self.persist(None)?;
        let _ = self.session_tx.send(None);
        info!("Signed out");
        Ok(())
    }

    /// Current session, if signed in and not expired
    pub fn session(&self) -> Option<Session> {
        self.session_rx
            .borrow()
            .clone()
            .filter(|s| !s.is_expired())
    }

    /// Watch session changes
    pub fn subscribe_session(&self) -> watch::Receiver<Option<Session>> {
        self.session_rx.clone()
    }

    /// Stamp the reviewer's last_login on the admin row
    async fn touch_last_login(&self, session: &Session) -> Result<(), AuthError> {
        let url = format!(
            "{}/rest/v1/{}?id=eq.{}",
            self.base_url, ADMIN_TABLE, session.user_id
        );
        self.http
            .patch(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .json(&json!({ "last_login": Utc::now() }))
            .send()
            .await?
            .error_for_status()?;
        debug!("last_login updated");
        Ok(())
    }

    fn persist(&self, session: Option<&Session>) -> Result<(), AuthError> {
        match session {
            Some(session) => {
                if let Some(parent) = self.session_path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| AuthError::Session(e.to_string()))?;
                }
                let json = serde_json::to_string_pretty(session)
                    .map_err(|e| AuthError::Session(e.to_string()))?;
                std::fs::write(&self.session_path, json)
                    .map_err(|e| AuthError::Session(e.to_string()))?;
            }
            None => {
                if self.session_path.exists() {
                    std::fs::remove_file(&self.session_path)
                        .map_err(|e| AuthError::Session(e.to_string()))?;
                }
            }
        }
        Ok(())
    }
}

/// Read a persisted session, dropping it if expired or unreadable
fn load_persisted(path: &PathBuf) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    let session: Session = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            warn!("Ignoring unreadable session file: {}", e);
            return None;
        }
    };
    if session.is_expired() {
        debug!("Persisted session expired");
        return None;
    }
    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            access_token: "jwt-123".to_string(),
            user_id: "u1".to_string(),
            email: "admin@example.com".to_string(),
            expires_at,
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.base_url = "https://project.example.co".to_string();
        config.api_key = "anon-key".to_string();
        config.data_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_session_expiry() {
        assert!(!session(None).is_expired());
        assert!(!session(Some(Utc::now() + Duration::hours(1))).is_expired());
        assert!(session(Some(Utc::now() - Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_persisted_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let client = AuthClient::new(&config);
        assert!(client.session().is_none());

        let live = session(Some(Utc::now() + Duration::hours(1)));
        client.persist(Some(&live)).unwrap();

        let restored = AuthClient::new(&config);
        assert_eq!(restored.session(), Some(live));
    }

    #[test]
    fn test_expired_persisted_session_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let client = AuthClient::new(&config);

        let stale = session(Some(Utc::now() - Duration::hours(1)));
        client.persist(Some(&stale)).unwrap();

        let restored = AuthClient::new(&config);
        assert!(restored.session().is_none());
    }

    #[test]
    fn test_garbage_session_file_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        std::fs::write(config.session_file_path(), "not json").unwrap();

        let client = AuthClient::new(&config);
        assert!(client.session().is_none());
    }
}
