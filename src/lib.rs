// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
mod api;
mod detector;
mod device;
mod session;
mod settings;
mod updater;

use api::{ApiClient, ApiError, UserProfile, Webinar};
use detector::catalog::RecordingAppCatalog;
use detector::monitor::CaptureMonitor;
use detector::process_list::SystemProcessList;
use detector::state::DetectionConfig;
use serde::Serialize;
use session::{ActiveSession, StoredSession};
use std::sync::Mutex;
use tauri::{Emitter, Manager};

struct ViewerAppState {
    api: ApiClient,
    session: Mutex<Option<ActiveSession>>,
    monitor: CaptureMonitor,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestoreOutcome {
    restored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

fn current_session(state: &tauri::State<'_, ViewerAppState>) -> Result<ActiveSession, String> {
    state
        .session
        .lock()
        .map_err(|_| "session lock poisoned".to_string())?
        .clone()
        .ok_or_else(|| ApiError::NotSignedIn.to_string())
}

#[tauri::command]
async fn login(
    state: tauri::State<'_, ViewerAppState>,
    username: String,
    password: String,
    remember: bool,
) -> Result<(), String> {
    let mac = device::device_mac()?;
    let data = state
        .api
        .login(&username, &password, &mac)
        .await
        .map_err(|e| e.to_string())?;

    {
        let mut active = state
            .session
            .lock()
            .map_err(|_| "session lock poisoned")?;
        *active = Some(ActiveSession {
            token: data.token.clone(),
            device_mac: mac.clone(),
        });
    }

    if remember {
        let stored = StoredSession::new(data.token, mac, Some(username));
        if let Err(e) = session::save(&stored) {
            log::warn!("could not persist session: {e}");
        }
    } else {
        session::clear();
    }
    Ok(())
}

/// Validate any remembered session against the platform before adopting
/// it. A rejected or unreachable session is discarded; the username still
/// comes back so the login form can prefill.
#[tauri::command]
async fn restore_session(
    state: tauri::State<'_, ViewerAppState>,
) -> Result<RestoreOutcome, String> {
    let Some(stored) = session::load() else {
        return Ok(RestoreOutcome {
            restored: false,
            username: None,
        });
    };

    match state
        .api
        .check_session(&stored.token, &stored.device_mac)
        .await
    {
        Ok(()) => {
            {
                let mut active = state
                    .session
                    .lock()
                    .map_err(|_| "session lock poisoned")?;
                *active = Some(ActiveSession::from(&stored));
            }
            Ok(RestoreOutcome {
                restored: true,
                username: stored.username,
            })
        }
        Err(e) => {
            log::info!("stored session rejected: {e}");
            session::clear();
            Ok(RestoreOutcome {
                restored: false,
                username: stored.username,
            })
        }
    }
}

#[tauri::command]
fn logout(state: tauri::State<'_, ViewerAppState>) -> Result<(), String> {
    let mut active = state
        .session
        .lock()
        .map_err(|_| "session lock poisoned")?;
    *active = None;
    session::clear();
    Ok(())
}

#[tauri::command]
async fn get_profile(state: tauri::State<'_, ViewerAppState>) -> Result<UserProfile, String> {
    let active = current_session(&state)?;
    state
        .api
        .profile(&active.token, &active.device_mac)
        .await
        .map_err(|e| e.to_string())
}

/// Purchased webinars that can still be played, expiry already filtered.
#[tauri::command]
async fn get_webinars(state: tauri::State<'_, ViewerAppState>) -> Result<Vec<Webinar>, String> {
    let active = current_session(&state)?;
    let webinars = state
        .api
        .purchased_webinars(&active.token, &active.device_mac)
        .await
        .map_err(|e| e.to_string())?;
    Ok(api::active_webinars(webinars, chrono::Utc::now().timestamp()))
}

#[tauri::command]
fn viewer_url(link: String) -> String {
    api::learning_app_url(&link)
}

#[tauri::command]
fn get_mac_address() -> Result<String, String> {
    device::device_mac()
}

#[tauri::command]
fn toggle_fullscreen(window: tauri::Window) -> Result<(), String> {
    let current = window.is_fullscreen().map_err(|e| e.to_string())?;
    window.set_fullscreen(!current).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = settings::ApiSettings::from_env();

    tauri::Builder::default()
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_process::init())
        .manage(ViewerAppState {
            api: ApiClient::new(&settings),
            session: Mutex::new(None),
            monitor: CaptureMonitor::new(),
        })
        .setup(|app| {
            let state = app.state::<ViewerAppState>();

            let catalog = RecordingAppCatalog::resolve();
            if catalog.is_empty() {
                log::warn!("recording-tool catalog is empty, detection will never trigger");
            }
            state
                .monitor
                .start(SystemProcessList, catalog, DetectionConfig::default());

            // Bridge the monitor to the webview. Emit results are ignored;
            // a closed window is not the poll loop's problem.
            let rx = state.monitor.subscribe();
            let app_handle = app.handle().clone();
            std::thread::spawn(move || {
                while let Ok(status) = rx.recv() {
                    let _ = app_handle.emit("screen-capture-status", &status);
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            login,
            logout,
            restore_session,
            get_profile,
            get_webinars,
            viewer_url,
            get_mac_address,
            toggle_fullscreen,
            updater::check_for_updates,
            updater::install_update,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_outcome_serializes_for_frontend() {
        let restored = serde_json::to_value(RestoreOutcome {
            restored: true,
            username: Some("student@example.com".to_string()),
        })
        .expect("serialize");
        assert_eq!(
            restored,
            serde_json::json!({"restored": true, "username": "student@example.com"})
        );

        let fresh = serde_json::to_value(RestoreOutcome {
            restored: false,
            username: None,
        })
        .expect("serialize");
        assert_eq!(fresh, serde_json::json!({"restored": false}));
    }

    #[test]
    fn viewer_url_rewrites_course_links() {
        assert_eq!(
            viewer_url("https://panel.example/course/algebra".to_string()),
            "https://panel.example/course/learning_app/algebra"
        );
    }
}
