use super::catalog::RecordingAppCatalog;

const EXE_SUFFIX: &str = ".exe";

/// Comparison form of a process name: lower-cased, all whitespace removed.
/// Dots, digits and parenthesized decorations stay, which is what makes the
/// substring test below catch entries like `"OBS64.exe (32100)"`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Strip one trailing `.exe` (any casing), leaving the rest of the name as
/// written in the catalog.
pub fn strip_exe_suffix(name: &str) -> &str {
    if name.len() >= EXE_SUFFIX.len() {
        let split = name.len() - EXE_SUFFIX.len();
        if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(EXE_SUFFIX) {
            return &name[..split];
        }
    }
    name
}

/// Whether any snapshot entry contains the candidate after normalization.
/// A candidate that normalizes to nothing never matches; it would otherwise
/// be a substring of every process and latch the detector on permanently.
pub fn is_process_active(candidate: &str, snapshot: &[String]) -> bool {
    let needle = normalize(candidate);
    if needle.is_empty() {
        return false;
    }
    snapshot.iter().any(|process| normalize(process).contains(&needle))
}

/// First catalog entry whose process is currently running, reported with
/// its `.exe` suffix removed. Catalog order is the tie-break, so the result
/// is deterministic when several tools run at once.
pub fn find_active_app(catalog: &RecordingAppCatalog, snapshot: &[String]) -> Option<String> {
    catalog.process_names().find_map(|name| {
        let candidate = strip_exe_suffix(name);
        is_process_active(candidate, snapshot).then(|| candidate.to_string())
    })
}
