//! Errors produced by the move pipeline.
//!
//! Batch precondition errors abort a submission before any I/O.
//! Every other variant is captured into the result of the single file it concerns.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("No destination folder selected")]
    DestinationMissing,

    #[error("No files to move")]
    NothingToMove,

    #[error("A move batch is already in progress")]
    Busy,

    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Destination folder is missing or not writable: {}", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("File already exists at destination: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file source: {0}")]
    UnsupportedFileSource(String),

    #[error("{0} conflict(s) still need an action")]
    UnresolvedConflicts(usize),

    #[error("There are no conflicts waiting for a decision")]
    NoPendingConflicts,

    #[error("Conflict index {index} is out of range for {count} conflict(s)")]
    ConflictIndexOutOfRange { index: usize, count: usize },
}

#[cfg(test)]
mod move_error_tests {
    use super::*;

    #[test]
    fn messages_include_paths() {
        let error = MoveError::AlreadyExists(PathBuf::from("/dest/a.txt"));
        assert_eq!(error.to_string(), "File already exists at destination: /dest/a.txt");

        let error = MoveError::WriteFailed {
            path: PathBuf::from("/dest/b.txt"),
            source: io::Error::other("disk full"),
        };
        assert_eq!(error.to_string(), "Failed to write /dest/b.txt: disk full");
    }
}
