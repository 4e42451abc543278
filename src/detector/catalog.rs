use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Known screen-recording tools, grouped by category. The groups only exist
/// for maintainability of the JSON file; matching flattens them in order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordingAppCatalog {
    #[serde(rename = "recordingApps", default)]
    categories: Vec<CatalogCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCategory {
    pub category: String,
    #[serde(default)]
    pub processes: Vec<String>,
}

/// Catalog shipped inside the binary, used unless the user provides an
/// override file.
const BUNDLED_CATALOG: &str = include_str!("../../resources/recording-apps.json");

fn override_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("com.lectern.app").join("recording-apps.json"))
}

impl RecordingAppCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_categories(categories: Vec<CatalogCategory>) -> Self {
        Self { categories }
    }

    /// Parse catalog JSON. `None` on malformed input; the caller decides how
    /// loudly to degrade.
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// Read a catalog file. Missing or malformed files degrade to the empty
    /// catalog so a bad edit can never take the player down.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("could not read catalog {}: {e}", path.display());
                return Self::empty();
            }
        };
        match Self::parse(&contents) {
            Some(catalog) => catalog,
            None => {
                log::warn!("malformed catalog {}, using empty catalog", path.display());
                Self::empty()
            }
        }
    }

    /// The catalog the running app should use: the user override when one
    /// exists, otherwise the bundled default.
    pub fn resolve() -> Self {
        let catalog = match override_path().filter(|p| p.is_file()) {
            Some(path) => {
                log::info!("using catalog override at {}", path.display());
                Self::load(&path)
            }
            None => Self::parse(BUNDLED_CATALOG).unwrap_or_else(|| {
                log::warn!("bundled catalog is malformed, using empty catalog");
                Self::empty()
            }),
        };
        for category in &catalog.categories {
            log::debug!(
                "catalog category {}: {} processes",
                category.category,
                category.processes.len()
            );
        }
        catalog
    }

    /// Process names in catalog order, categories flattened. Matching relies
    /// on this order for its deterministic tie-break.
    pub fn process_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.processes.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.processes.is_empty())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.processes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_catalog_in_order() {
        let json = r#"{
            "recordingApps": [
                {"category": "streaming", "processes": ["obs64.exe", "xsplit.exe"]},
                {"category": "capture", "processes": ["bandicam.exe"]}
            ]
        }"#;
        let catalog = RecordingAppCatalog::parse(json).expect("parse");
        let names: Vec<&str> = catalog.process_names().collect();
        assert_eq!(names, ["obs64.exe", "xsplit.exe", "bandicam.exe"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn missing_processes_field_defaults_to_empty() {
        let json = r#"{"recordingApps": [{"category": "misc"}]}"#;
        let catalog = RecordingAppCatalog::parse(json).expect("parse");
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_json_parses_to_none() {
        assert!(RecordingAppCatalog::parse("not valid json").is_none());
        assert!(RecordingAppCatalog::parse(r#"{"recordingApps": "nope"}"#).is_none());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let catalog = RecordingAppCatalog::load(&dir.path().join("nonexistent.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("recording-apps.json");
        std::fs::write(&path, "{{{{").expect("write corrupt file");
        assert!(RecordingAppCatalog::load(&path).is_empty());
    }

    #[test]
    fn duplicate_entries_across_categories_are_kept() {
        let json = r#"{
            "recordingApps": [
                {"category": "a", "processes": ["obs64.exe"]},
                {"category": "b", "processes": ["obs64.exe"]}
            ]
        }"#;
        let catalog = RecordingAppCatalog::parse(json).expect("parse");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = RecordingAppCatalog::parse(BUNDLED_CATALOG).expect("bundled catalog parses");
        assert!(!catalog.is_empty());
    }
}
