use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

/// Upper bound on one process-table query. A hung platform utility must
/// never stall the poll loop; on expiry the poll sees an empty snapshot.
const QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of the running-process snapshot. The poll loop only ever talks to
/// this trait, so tests can script snapshots without touching the OS.
pub trait ProcessEnumerator {
    /// Lower-cased names of the processes currently running. Any failure
    /// (spawn error, timeout, unparseable output) yields an empty list.
    fn running_processes(&self) -> Vec<String>;
}

/// Enumerator backed by the platform process utility: `tasklist` on
/// Windows, `ps` everywhere else.
pub struct SystemProcessList;

impl ProcessEnumerator for SystemProcessList {
    fn running_processes(&self) -> Vec<String> {
        snapshot()
    }
}

#[cfg(windows)]
fn snapshot() -> Vec<String> {
    use std::os::windows::process::CommandExt;
    // Keep the console window from flashing up on every poll.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let mut cmd = Command::new("tasklist");
    cmd.args(["/FO", "CSV", "/NH"]).creation_flags(CREATE_NO_WINDOW);
    match run_bounded(cmd) {
        Some(stdout) => parse_tasklist_csv(&stdout),
        None => Vec::new(),
    }
}

#[cfg(not(windows))]
fn snapshot() -> Vec<String> {
    let mut cmd = Command::new("ps");
    cmd.args(["-A", "-o", "comm="]);
    match run_bounded(cmd) {
        Some(stdout) => parse_ps_output(&stdout),
        None => Vec::new(),
    }
}

/// Run a command and return its stdout, giving up after `QUERY_TIMEOUT`.
/// The wait happens on a helper thread so the caller can bail out on a
/// channel timeout; a leaked waiter thread simply exits when the child does.
fn run_bounded(mut cmd: Command) -> Option<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(cmd.output());
    });
    match rx.recv_timeout(QUERY_TIMEOUT) {
        Ok(Ok(output)) => {
            if !output.status.success() {
                log::warn!("process query exited with {}", output.status);
                return None;
            }
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Err(e)) => {
            log::warn!("process query failed to run: {e}");
            None
        }
        Err(_) => {
            log::warn!("process query timed out after {QUERY_TIMEOUT:?}");
            None
        }
    }
}

/// `tasklist /FO CSV /NH` rows look like `"obs64.exe","1234",...`; the
/// image name is the first quoted field.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_tasklist_csv(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix('"')?;
            let name = &rest[..rest.find('"')?];
            (!name.is_empty()).then(|| name.to_lowercase())
        })
        .collect()
}

/// `ps -A -o comm=` prints one command per line, sometimes as a full path.
#[cfg_attr(windows, allow(dead_code))]
fn parse_ps_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
            (!name.is_empty()).then(|| name.to_lowercase())
        })
        .collect()
}

/// Test double that replays a fixed sequence of snapshots and counts how
/// often it was asked. Once the sequence is down to one entry it repeats it.
#[cfg(test)]
pub(crate) struct ScriptedProcessList {
    snapshots: std::sync::Mutex<std::collections::VecDeque<Vec<String>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedProcessList {
    pub(crate) fn new(snapshots: &[&[&str]]) -> Self {
        Self {
            snapshots: std::sync::Mutex::new(
                snapshots
                    .iter()
                    .map(|s| s.iter().map(|p| p.to_string()).collect())
                    .collect(),
            ),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl ProcessEnumerator for ScriptedProcessList {
    fn running_processes(&self) -> Vec<String> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut queue = self.snapshots.lock().expect("snapshots lock");
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasklist_csv_takes_first_quoted_field() {
        let output = "\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r\n\
                      \"OBS64.exe\",\"32100\",\"Console\",\"1\",\"210,004 K\"\r\n\
                      \"svchost.exe\",\"988\",\"Services\",\"0\",\"9,312 K\"\r\n";
        let names = parse_tasklist_csv(output);
        assert_eq!(names, ["system idle process", "obs64.exe", "svchost.exe"]);
    }

    #[test]
    fn tasklist_lines_without_quotes_are_skipped() {
        let output = "INFO: No tasks are running which match the specified criteria.\r\n";
        assert!(parse_tasklist_csv(output).is_empty());
    }

    #[test]
    fn ps_output_is_lowercased_and_basenamed() {
        let output = "/Applications/OBS.app/Contents/MacOS/OBS\n\
                      /usr/sbin/sshd\n\
                      bash\n\
                      \n";
        let names = parse_ps_output(output);
        assert_eq!(names, ["obs", "sshd", "bash"]);
    }

    #[test]
    fn ps_line_ending_in_slash_is_skipped() {
        assert!(parse_ps_output("/weird/path/\n").is_empty());
    }

    #[test]
    fn scripted_list_replays_then_repeats_last() {
        let list = ScriptedProcessList::new(&[&["a"], &["b"]]);
        assert_eq!(list.running_processes(), ["a"]);
        assert_eq!(list.running_processes(), ["b"]);
        assert_eq!(list.running_processes(), ["b"]);
        assert_eq!(list.calls(), 3);
    }
}
