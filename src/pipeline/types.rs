use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::pipeline::MoveError;

/// Default suffix inserted before the counter when a conflicting file is renamed.
pub const DEFAULT_COPY_SUFFIX: &str = "Cópia";

/// A file selected for moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    pub source: FileSource,
}

/// Where the content of a [`FileRef`] comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file on a local filesystem, moved by path.
    Local(PathBuf),
    /// Content handed over in memory, for example a file dropped from a browser.
    Browser(Arc<[u8]>),
}

/// How a single file is written to its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// Fail if the target already exists.
    Direct,
    /// Pick a free `name_<suffix>_<n>.ext` next to the existing target.
    Rename,
    /// Delete the existing target first.
    Replace,
    /// Do nothing.
    Skip,
}

/// User decision for a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictAction {
    #[default]
    Pending,
    Rename,
    Replace,
    Skip,
}

/// A file whose organized destination path is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub file: FileRef,
    /// Index of the file in the submitted batch.
    pub position: usize,
    /// Path relative to the destination folder.
    pub organized_path: String,
    /// Absolute path that is already taken, on disk or by an earlier file of the batch.
    pub destination_path: PathBuf,
    pub action: ConflictAction,
}

/// Options for executing moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOptions {
    pub copy_suffix: String,
}

/// Outcome of moving one file.
#[derive(Debug)]
pub enum MoveStatus {
    /// Moved with an atomic rename.
    Moved,
    /// Copied to the target and the source removed afterwards.
    MovedByCopy,
    /// Copied to the target but the source could not be removed.
    CopiedSourceKept,
    /// In-memory content written to the target.
    Written,
    Skipped,
    Failed(MoveError),
}

/// Result for one file of a batch.
#[derive(Debug)]
pub struct MoveResult {
    pub file_name: String,
    /// Final path of the file, `None` when skipped or failed.
    pub target: Option<PathBuf>,
    pub status: MoveStatus,
}

/// Per-file results of a batch and their aggregate counts.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<MoveResult>,
}

impl FileRef {
    /// Reference a local file, reading its name and size from the filesystem.
    ///
    /// # Errors
    /// Returns an error if the file metadata cannot be read.
    pub fn local(path: &Path) -> anyhow::Result<Self> {
        let metadata = std::fs::metadata(path).with_context(|| format!("Failed to read {}", path.display()))?;
        if metadata.is_dir() {
            anyhow::bail!("Not a file: {}", path.display());
        }
        Ok(Self {
            name: crate::get_normalized_file_name(path)?,
            size: metadata.len(),
            source: FileSource::Local(path.to_path_buf()),
        })
    }

    /// Reference in-memory content with the given file name.
    pub fn browser(name: impl Into<String>, payload: impl Into<Arc<[u8]>>) -> Self {
        let payload: Arc<[u8]> = payload.into();
        Self {
            name: name.into(),
            size: payload.len() as u64,
            source: FileSource::Browser(payload),
        }
    }

    /// Source path for local files.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Local(path) => Some(path),
            FileSource::Browser(_) => None,
        }
    }

    #[must_use]
    pub const fn is_browser(&self) -> bool {
        matches!(self.source, FileSource::Browser(_))
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => f.debug_tuple("Local").field(path).finish(),
            Self::Browser(payload) => write!(f, "Browser({} bytes)", payload.len()),
        }
    }
}

impl ConflictAction {
    /// Move mode for a decided action, `None` while pending.
    #[must_use]
    pub const fn mode(self) -> Option<MoveMode> {
        match self {
            Self::Pending => None,
            Self::Rename => Some(MoveMode::Rename),
            Self::Replace => Some(MoveMode::Replace),
            Self::Skip => Some(MoveMode::Skip),
        }
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl FromStr for ConflictAction {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "r" | "rename" => Ok(Self::Rename),
            "o" | "replace" | "overwrite" => Ok(Self::Replace),
            "s" | "skip" => Ok(Self::Skip),
            other => Err(anyhow::anyhow!("Unknown conflict action: '{other}'")),
        }
    }
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Rename => "rename",
            Self::Replace => "replace",
            Self::Skip => "skip",
        };
        write!(f, "{name}")
    }
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl MoveStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    #[must_use]
    pub const fn error(&self) -> Option<&MoveError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl MoveResult {
    pub(crate) fn done(file_name: &str, target: PathBuf, status: MoveStatus) -> Self {
        Self {
            file_name: file_name.to_string(),
            target: Some(target),
            status,
        }
    }

    pub(crate) fn skipped(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            target: None,
            status: MoveStatus::Skipped,
        }
    }

    pub(crate) fn failed(file_name: &str, error: MoveError) -> Self {
        Self {
            file_name: file_name.to_string(),
            target: None,
            status: MoveStatus::Failed(error),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.status.is_skipped()
    }

    /// Human readable description of the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.status {
            MoveStatus::Moved | MoveStatus::Written => "File moved".to_string(),
            MoveStatus::MovedByCopy => "File moved (via copy)".to_string(),
            MoveStatus::CopiedSourceKept => "File copied (original kept)".to_string(),
            MoveStatus::Skipped => "Skipped by user".to_string(),
            MoveStatus::Failed(error) => error.to_string(),
        }
    }
}

impl BatchReport {
    #[must_use]
    pub const fn new(results: Vec<MoveResult>) -> Self {
        Self { results }
    }

    /// Number of files moved, skipped files not included.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success() && !r.is_skipped()).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success()).count()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when every file was either moved or skipped.
    #[must_use]
    pub fn all_handled(&self) -> bool {
        self.failed() == 0
    }

    /// Iterate over the failed results.
    pub fn failures(&self) -> impl Iterator<Item = &MoveResult> {
        self.results.iter().filter(|r| !r.success())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moved, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )
    }
}
