use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Session persisted across launches when the user ticked "remember me".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub device_mac: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub saved_at: Option<String>,
}

impl StoredSession {
    pub fn new(token: String, device_mac: String, username: Option<String>) -> Self {
        Self {
            token,
            device_mac,
            username,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Live session held in managed state after login or restore.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub token: String,
    pub device_mac: String,
}

impl From<&StoredSession> for ActiveSession {
    fn from(stored: &StoredSession) -> Self {
        Self {
            token: stored.token.clone(),
            device_mac: stored.device_mac.clone(),
        }
    }
}

fn session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("com.lectern.app").join("session.json"))
}

fn usable(session: &StoredSession) -> bool {
    !session.token.is_empty() && !session.device_mac.is_empty()
}

/// Stored session, if a usable one exists. Missing or corrupt files mean
/// "not remembered", never an error.
pub fn load() -> Option<StoredSession> {
    let path = session_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    let session: StoredSession = serde_json::from_str(&contents).ok()?;
    usable(&session).then_some(session)
}

pub fn save(session: &StoredSession) -> Result<(), String> {
    let path = session_path().ok_or("config dir not found")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(session).map_err(|e| e.to_string())?;
    std::fs::write(&path, json).map_err(|e| e.to_string())
}

pub fn clear() {
    if let Some(path) = session_path() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_json() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("session.json");

        let session = StoredSession::new(
            "tok-123".to_string(),
            "aa:bb:cc:dd:ee:ff".to_string(),
            Some("student@example.com".to_string()),
        );
        let json = serde_json::to_string_pretty(&session).expect("serialize");
        std::fs::write(&path, &json).expect("write");

        let loaded: StoredSession =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read"))
                .expect("deserialize");
        assert_eq!(loaded.token, "tok-123");
        assert_eq!(loaded.device_mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(loaded.username.as_deref(), Some("student@example.com"));
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn old_file_without_username_still_loads() {
        let json = r#"{"token": "tok", "device_mac": "aa:bb:cc:dd:ee:ff"}"#;
        let session: StoredSession = serde_json::from_str(json).expect("deserialize");
        assert!(usable(&session));
        assert!(session.username.is_none());
        assert!(session.saved_at.is_none());
    }

    #[test]
    fn blank_fields_are_not_usable() {
        let no_token: StoredSession =
            serde_json::from_str(r#"{"token": "", "device_mac": "aa:bb:cc:dd:ee:ff"}"#)
                .expect("deserialize");
        assert!(!usable(&no_token));

        let no_mac: StoredSession =
            serde_json::from_str(r#"{"token": "tok", "device_mac": ""}"#).expect("deserialize");
        assert!(!usable(&no_mac));
    }

    #[test]
    fn corrupt_json_is_rejected() {
        assert!(serde_json::from_str::<StoredSession>("not valid json").is_err());
    }

    #[test]
    fn active_session_copies_credentials() {
        let stored = StoredSession::new("tok".to_string(), "aa:bb:cc:dd:ee:ff".to_string(), None);
        let active = ActiveSession::from(&stored);
        assert_eq!(active.token, "tok");
        assert_eq!(active.device_mac, "aa:bb:cc:dd:ee:ff");
    }
}
