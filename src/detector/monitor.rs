use super::catalog::RecordingAppCatalog;
use super::process_list::ProcessEnumerator;
use super::state::{CaptureStatus, DetectionConfig, DetectionState};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

/// Floor for the poll cadence so a zero interval cannot spin a core.
const MIN_TICK: Duration = Duration::from_millis(10);

/// Runs the detection loop on a background thread and fans the stable
/// status out to subscribers. The status is published every tick whether or
/// not it changed, so a late subscriber converges within one interval.
#[derive(Clone)]
pub struct CaptureMonitor {
    subscribers: Arc<Mutex<Vec<Sender<CaptureStatus>>>>,
    running: Arc<AtomicBool>,
}

impl CaptureMonitor {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a subscriber. Delivery is fire-and-forget over an unbounded
    /// channel; a receiver that goes away is pruned at the next publish and
    /// never affects the others.
    pub fn subscribe(&self) -> Receiver<CaptureStatus> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Spawn the poll thread. Polls run sequentially on that one thread, so
    /// they can never overlap. Calling start on a running monitor is a
    /// logged no-op.
    pub fn start<P>(&self, processes: P, catalog: RecordingAppCatalog, config: DetectionConfig)
    where
        P: ProcessEnumerator + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            log::warn!("capture monitor already running");
            return;
        }

        let subscribers = Arc::clone(&self.subscribers);
        let running = Arc::clone(&self.running);
        let tick = config.check_interval.max(MIN_TICK);
        std::thread::spawn(move || {
            log::info!(
                "capture monitor started, watching for {} known recorders",
                catalog.len()
            );
            let mut state = DetectionState::new();
            while running.load(Ordering::SeqCst) {
                // A panic anywhere below must not kill the loop or leak to
                // subscribers as silence; they see not-recording instead.
                let status = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    state.poll(&processes, &catalog, &config, Instant::now())
                }))
                .unwrap_or_else(|_| CaptureStatus::not_recording());
                publish(&subscribers, &status);
                std::thread::sleep(tick);
            }
            log::info!("capture monitor stopped");
        });
    }

    /// Ask the poll thread to exit at its next tick. The application never
    /// calls this; it exists for tests and keeps shutdown deterministic.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn publish(subscribers: &Mutex<Vec<Sender<CaptureStatus>>>, status: &CaptureStatus) {
    let Ok(mut subscribers) = subscribers.lock() else {
        return;
    };
    subscribers.retain(|tx| tx.send(status.clone()).is_ok());
}
