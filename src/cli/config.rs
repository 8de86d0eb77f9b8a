use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::types::Role;

pub const DEFAULT_SERVER: &str = "http://localhost:5000";

/// Persisted CLI session: which server to talk to and the token issued by it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub server: String,
    pub token: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: None,
            email: None,
            role: None,
            signed_in_at: None,
        }
    }
}

impl Session {
    pub fn sign_in(&mut self, token: String, email: String, role: Option<Role>) {
        self.token = Some(token);
        self.email = Some(email);
        self.role = role;
        self.signed_in_at = Some(Utc::now());
    }

    pub fn sign_out(&mut self) {
        self.token = None;
        self.email = None;
        self.role = None;
        self.signed_in_at = None;
    }

    /// Client for the session's server, carrying the token when there is one
    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let client = ApiClient::new(&self.server)?;
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Like [`Session::client`] but fails early when nobody is signed in
    pub fn authenticated_client(&self) -> anyhow::Result<ApiClient> {
        if self.token.is_none() {
            return Err(anyhow::anyhow!("Not signed in. Run `melody auth login <email>` first"));
        }
        self.client()
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("MELODY_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("melody").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Session> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(Session::default());
    }

    let content = fs::read_to_string(session_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");
    fs::write(session_file, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_out_keeps_server() {
        let mut session = Session {
            server: "http://studio.example:8080".into(),
            ..Default::default()
        };
        session.sign_in("tok".into(), "ana@example.com".into(), Some(Role::Client));
        assert!(session.authenticated_client().is_ok());

        session.sign_out();
        assert_eq!(session.server, "http://studio.example:8080");
        assert!(session.token.is_none());
        assert!(session.authenticated_client().is_err());
    }

    #[test]
    fn test_session_round_trips_through_disk_format() {
        let mut session = Session::default();
        session.sign_in("tok".into(), "ana@example.com".into(), Some(Role::Musician));
        let restored: Session = serde_json::from_str(&serde_json::to_string(&session).unwrap()).unwrap();
        assert_eq!(restored.role, Some(Role::Musician));
        assert_eq!(restored.token.as_deref(), Some("tok"));
    }
}
