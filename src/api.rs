use crate::settings::ApiSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or decoding failure; no usable envelope came back.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The platform rejected the request. Carries the server message code
    /// verbatim (`auth.incorrect`, ...) so the frontend can localize it.
    #[error("{0}")]
    Platform(String),
    #[error("response envelope carried no data")]
    EmptyData,
    #[error("not signed in")]
    NotSignedIn,
}

/// Every platform response wraps its payload in this envelope, on error
/// status codes too. The `success` flag is authoritative, not the HTTP
/// status.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn failure(self) -> ApiError {
        ApiError::Platform(
            self.message
                .unwrap_or_else(|| "unknown platform error".to_string()),
        )
    }

    fn into_data(self) -> Result<T, ApiError> {
        if self.success {
            self.data.ok_or(ApiError::EmptyData)
        } else {
            Err(self.failure())
        }
    }

    /// For endpoints where only the flag matters and `data` may be absent.
    fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(self.failure())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
struct WebinarsData {
    #[serde(default)]
    webinars: Vec<Webinar>,
}

/// One purchased webinar as the panel API reports it. Serialized back to
/// the frontend unchanged, so the wire field names stay as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webinar {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub link: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "teacher")]
    pub instructor: Option<Instructor>,
    pub purchased_at: i64,
    pub expire_on: i64,
    #[serde(default)]
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub full_name: String,
}

impl Webinar {
    /// Expired purchases stay in the server listing; the client only shows
    /// the ones that can still be played.
    pub fn is_active(&self, now: i64) -> bool {
        !self.expired && self.expire_on > now
    }
}

/// Rewrite a course page URL to the chromeless player the app embeds.
pub fn learning_app_url(link: &str) -> String {
    link.replacen("/course/", "/course/learning_app/", 1)
}

pub fn active_webinars(webinars: Vec<Webinar>, now: i64) -> Vec<Webinar> {
    webinars.into_iter().filter(|w| w.is_active(now)).collect()
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        device_mac: &str,
    ) -> Result<LoginData, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
            "device_mac": device_mac,
        });
        let envelope: Envelope<LoginData> = self
            .http
            .post(self.url("/login"))
            .header("x-api-key", &self.api_key)
            .header("x-device-mac", device_mac)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }

    pub async fn check_session(&self, token: &str, device_mac: &str) -> Result<(), ApiError> {
        let envelope: Envelope<serde_json::Value> = self
            .http
            .post(self.url("/check-session"))
            .header("x-api-key", &self.api_key)
            .header("x-device-mac", device_mac)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?
            .json()
            .await?;
        envelope.into_ack()
    }

    pub async fn profile(&self, token: &str, device_mac: &str) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<ProfileData> = self
            .http
            .get(self.url("/panel/profile-setting"))
            .header("x-api-key", &self.api_key)
            .header("x-device-mac", device_mac)
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data().map(|data| data.user)
    }

    pub async fn purchased_webinars(
        &self,
        token: &str,
        device_mac: &str,
    ) -> Result<Vec<Webinar>, ApiError> {
        let envelope: Envelope<WebinarsData> = self
            .http
            .get(self.url("/panel/webinars/purchases"))
            .header("x-api-key", &self.api_key)
            .header("x-device-mac", device_mac)
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        // The platform omits `data` when the user owns nothing; that is an
        // empty list, not an error.
        match envelope {
            Envelope {
                success: true,
                data,
                ..
            } => Ok(data.map(|d| d.webinars).unwrap_or_default()),
            envelope => Err(envelope.failure()),
        }
    }
}
