use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension Transmission gives incomplete files
pub const DEFAULT_PARTIAL_SUFFIX: &str = "part";

/// Decides whether a destination path has already been acquired
pub trait DownloadFilter: Send + Sync {
    /// True if the file or its in-progress marker exists
    fn exists(&self, path: &Path) -> bool;
}

/// Filesystem filter that also treats in-progress markers as present
///
/// For `Show - 01.mkv` with marker `part` the candidates are:
/// `Show - 01.mkv`, `Show - 01.mkv.part` and `Show - 01.part`.
#[derive(Debug, Clone)]
pub struct PartialAwareFilter {
    marker: String,
}

impl PartialAwareFilter {
    /// Create a filter using the given marker extension (without the dot)
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self {
            marker: marker.trim_start_matches('.').to_string(),
        }
    }

    /// All paths whose presence means `path` is acquired
    pub fn candidates(&self, path: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![path.to_path_buf()];

        if self.marker.is_empty() {
            return candidates;
        }

        let mut appended = OsString::from(path.as_os_str());
        appended.push(".");
        appended.push(&self.marker);
        candidates.push(PathBuf::from(appended));

        if path.extension().is_some() {
            candidates.push(path.with_extension(&self.marker));
        }

        candidates
    }
}

impl Default for PartialAwareFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PARTIAL_SUFFIX)
    }
}

impl DownloadFilter for PartialAwareFilter {
    fn exists(&self, path: &Path) -> bool {
        self.candidates(path).iter().any(|candidate| candidate.exists())
    }
}
