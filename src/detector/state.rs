use super::catalog::RecordingAppCatalog;
use super::matcher;
use super::process_list::ProcessEnumerator;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Consecutive matching polls required before the status flips to recording.
pub const DETECTION_THRESHOLD: u32 = 2;
/// Minimum spacing between two process-table queries.
pub const CHECK_INTERVAL: Duration = Duration::from_millis(3000);

/// Wire payload of the `screen-capture-status` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatus {
    pub is_recording: bool,
    pub detected_app: Option<String>,
}

impl CaptureStatus {
    pub fn not_recording() -> Self {
        Self {
            is_recording: false,
            detected_app: None,
        }
    }

    pub fn recording(app: impl Into<String>) -> Self {
        Self {
            is_recording: true,
            detected_app: Some(app.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionConfig {
    pub threshold: u32,
    pub check_interval: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DETECTION_THRESHOLD,
            check_interval: CHECK_INTERVAL,
        }
    }
}

/// Debounce state carried between polls. Single writer: the poll loop.
///
/// The debounce is asymmetric: flipping to recording takes `threshold`
/// consecutive matches, while one clean poll is enough to clear it again.
pub struct DetectionState {
    last_check: Option<Instant>,
    consecutive_matches: u32,
    stable: CaptureStatus,
}

impl DetectionState {
    pub fn new() -> Self {
        Self {
            last_check: None,
            consecutive_matches: 0,
            stable: CaptureStatus::not_recording(),
        }
    }

    /// One detection step: throttle, snapshot, match, debounce. Returns the
    /// stable status to publish. Never fails; every degraded path reports
    /// not-recording.
    pub fn poll(
        &mut self,
        processes: &dyn ProcessEnumerator,
        catalog: &RecordingAppCatalog,
        config: &DetectionConfig,
        now: Instant,
    ) -> CaptureStatus {
        if let Some(last) = self.last_check {
            if now.duration_since(last) < config.check_interval {
                return self.stable.clone();
            }
        }

        let snapshot = processes.running_processes();
        if snapshot.is_empty() {
            // Failed or empty enumeration clears the alarm at once. The
            // throttle timestamp is left alone so the next poll re-queries
            // immediately instead of trusting a blind interval.
            self.consecutive_matches = 0;
            self.stable = CaptureStatus::not_recording();
            return self.stable.clone();
        }

        self.last_check = Some(now);
        match matcher::find_active_app(catalog, &snapshot) {
            Some(app) => {
                self.consecutive_matches += 1;
                if self.consecutive_matches >= config.threshold {
                    if !self.stable.is_recording {
                        log::info!("screen recorder detected: {app}");
                    }
                    self.stable = CaptureStatus::recording(app);
                }
            }
            None => {
                if self.stable.is_recording {
                    log::info!("screen recorder gone, clearing status");
                }
                self.consecutive_matches = 0;
                self.stable = CaptureStatus::not_recording();
            }
        }
        self.stable.clone()
    }
}
