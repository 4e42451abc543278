use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tauri_plugin_updater::UpdaterExt;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    pub current_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

/// Ask the update endpoints whether a newer build exists. The result also
/// goes out as an event so update UI does not have to await the command.
#[tauri::command]
pub async fn check_for_updates(app: AppHandle) -> Result<Option<UpdateInfo>, String> {
    let updater = app.updater().map_err(|e| e.to_string())?;
    match updater.check().await {
        Ok(Some(update)) => {
            let info = UpdateInfo {
                version: update.version.clone(),
                current_version: update.current_version.clone(),
                notes: update.body.clone(),
            };
            log::info!("update available: {} -> {}", info.current_version, info.version);
            let _ = app.emit("update-available", &info);
            Ok(Some(info))
        }
        Ok(None) => Ok(None),
        Err(e) => {
            log::warn!("update check failed: {e}");
            let _ = app.emit("update-error", e.to_string());
            Err(e.to_string())
        }
    }
}

/// Download the pending update, stream progress to the frontend, install
/// and relaunch. Never returns on success.
#[tauri::command]
pub async fn install_update(app: AppHandle) -> Result<(), String> {
    let updater = app.updater().map_err(|e| e.to_string())?;
    let update = updater
        .check()
        .await
        .map_err(|e| e.to_string())?
        .ok_or("no update available")?;

    let progress_app = app.clone();
    let finished_app = app.clone();
    let mut downloaded: u64 = 0;
    update
        .download_and_install(
            move |chunk, total| {
                downloaded += chunk as u64;
                let _ = progress_app.emit("update-progress", UpdateProgress { downloaded, total });
            },
            move || {
                let _ = finished_app.emit("update-downloaded", ());
            },
        )
        .await
        .map_err(|e| {
            let _ = app.emit("update-error", e.to_string());
            e.to_string()
        })?;

    log::info!("update installed, restarting");
    app.restart()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_payload_shape() {
        let value = serde_json::to_value(UpdateProgress {
            downloaded: 1024,
            total: Some(4096),
        })
        .expect("serialize");
        assert_eq!(value, serde_json::json!({"downloaded": 1024, "total": 4096}));
    }

    #[test]
    fn update_info_omits_missing_notes() {
        let value = serde_json::to_value(UpdateInfo {
            version: "0.5.0".to_string(),
            current_version: "0.4.2".to_string(),
            notes: None,
        })
        .expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"version": "0.5.0", "currentVersion": "0.4.2"})
        );
    }
}
