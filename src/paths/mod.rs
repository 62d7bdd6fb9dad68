//! Path derivation and unit naming for transfer runs.
//!
//! This module owns the mapping between collections and files:
//! - `PathInfo`: root directory, working-directory name, and file extension
//! - Working-directory derivation (`<root>/<dirName>[ <prefix>]`)
//! - `NameFilter`: literal, case-sensitive prefix matching
//! - Extension-filtered enumeration of files in the working directory

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;

/// Immutable path information for a transfer run.
///
/// The file extension is stored without a leading dot or wildcard
/// ("json" is correct, "*.json" is not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    /// Root directory under which the working directory is created.
    pub root_path: PathBuf,

    /// Base name of the working directory.
    pub working_dir_name: String,

    /// Extension for files in the working directory, without the dot.
    pub file_extension: String,
}

impl PathInfo {
    /// Create path information, normalizing the extension.
    ///
    /// # Arguments
    /// * `root_path` - Root directory
    /// * `working_dir_name` - Working directory base name
    /// * `file_extension` - File extension, with or without leading dot/wildcard
    pub fn new(
        root_path: impl Into<PathBuf>,
        working_dir_name: impl Into<String>,
        file_extension: &str,
    ) -> Self {
        Self {
            root_path: root_path.into(),
            working_dir_name: working_dir_name.into(),
            file_extension: file_extension.trim_start_matches(['*', '.']).to_string(),
        }
    }

    /// Compute the working directory for a run.
    ///
    /// A non-empty name prefix is appended to the directory name after a
    /// single space: `<root>/<dirName> <prefix>`. The empty prefix leaves
    /// the directory name unchanged.
    pub fn working_dir(&self, prefix: &str) -> PathBuf {
        if prefix.is_empty() {
            self.root_path.join(&self.working_dir_name)
        } else {
            self.root_path
                .join(format!("{} {}", self.working_dir_name, prefix))
        }
    }

    /// Compute the file path for a collection inside a working directory.
    pub fn file_path(&self, dir: &Path, collection_name: &str) -> PathBuf {
        dir.join(format!("{}.{}", collection_name, self.file_extension))
    }
}

impl Default for PathInfo {
    /// Dated default: `<home>/Export <ddMonthYYYY>` with the `json`
    /// extension, falling back to the current directory when no home
    /// directory is available.
    fn default() -> Self {
        Self {
            root_path: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            working_dir_name: format!("Export {}", Local::now().format("%d%B%Y")),
            file_extension: "json".to_string(),
        }
    }
}

/// Literal name-prefix filter selecting collections and files for a run.
///
/// Matching is case-sensitive; the empty prefix matches every name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    prefix: String,
}

impl NameFilter {
    /// Create a filter from a literal prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The literal prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this filter matches every name.
    pub fn matches_all(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Test a name against the prefix.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// Anchored regex form (`^prefix`) for server-side name filtering.
    pub fn to_anchored_regex(&self) -> String {
        format!("^{}", self.prefix)
    }
}

/// A file selected for import, identified by its base name.
///
/// The base name doubles as the destination collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUnit {
    /// File name without the extension.
    pub name: String,

    /// Full path to the file.
    pub path: PathBuf,
}

/// Enumerate files in `dir` whose extension and base name match.
///
/// Only regular files directly inside `dir` are considered (non-recursive).
/// Results are sorted by name so enumeration order is stable.
pub async fn list_file_units(
    dir: &Path,
    extension: &str,
    filter: &NameFilter,
) -> Result<Vec<FileUnit>> {
    let mut units = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == extension);
        if !matches_ext {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if filter.matches(stem) {
                units.push(FileUnit {
                    name: stem.to_string(),
                    path,
                });
            }
        }
    }

    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_dir_without_prefix() {
        let info = PathInfo::new("/data", "Export", "json");
        assert_eq!(info.working_dir(""), PathBuf::from("/data/Export"));
    }

    #[test]
    fn test_working_dir_with_prefix() {
        let info = PathInfo::new("/data", "Export", "json");
        assert_eq!(info.working_dir("abc"), PathBuf::from("/data/Export abc"));
    }

    #[test]
    fn test_extension_normalization() {
        assert_eq!(PathInfo::new("/", "d", "*.json").file_extension, "json");
        assert_eq!(PathInfo::new("/", "d", ".json").file_extension, "json");
        assert_eq!(PathInfo::new("/", "d", "json").file_extension, "json");
    }

    #[test]
    fn test_default_root_is_home_dir() {
        let info = PathInfo::default();
        let expected = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        assert_eq!(info.root_path, expected);
        assert!(info.working_dir_name.starts_with("Export "));
        assert_eq!(info.file_extension, "json");
    }

    #[test]
    fn test_file_path() {
        let info = PathInfo::new("/data", "Export", "json");
        let dir = info.working_dir("");
        assert_eq!(
            info.file_path(&dir, "users"),
            PathBuf::from("/data/Export/users.json")
        );
    }

    #[test]
    fn test_filter_prefix_rules() {
        let filter = NameFilter::new("abc");
        assert!(filter.matches("abcDEF"));
        assert!(filter.matches("abc"));
        assert!(!filter.matches("xabc"));
        assert!(!filter.matches("ABCdef"));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = NameFilter::default();
        assert!(filter.matches_all());
        assert!(filter.matches("anything"));
        assert_eq!(filter.to_anchored_regex(), "^");
    }

    #[tokio::test]
    async fn test_list_file_units_filters_extension_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["abcOne.json", "abcTwo.json", "xabc.json", "abcThree.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("abcNested.json")).unwrap();

        let units = list_file_units(dir.path(), "json", &NameFilter::new("abc"))
            .await
            .unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["abcOne", "abcTwo"]);
    }

    #[tokio::test]
    async fn test_list_file_units_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.json", "alpha.json", "mid.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let units = list_file_units(dir.path(), "json", &NameFilter::default())
            .await
            .unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
