//! Conflict-aware move pipeline.
//!
//! A batch of files is checked against the destination folder, conflicts are resolved by the
//! caller (rename, replace or skip) and the files are then moved with per-file results.

mod batch;
mod detect;
mod error;
mod execute;
mod storage;
mod types;

pub use batch::{BatchState, MovePipeline, SubmitOutcome};
pub use detect::detect_conflicts;
pub use error::MoveError;
pub use execute::move_one;
pub use storage::{CopyFailure, LocalStorage, Storage};
pub use types::{
    BatchReport, Conflict, ConflictAction, DEFAULT_COPY_SUFFIX, FileRef, FileSource, MoveMode, MoveOptions, MoveResult,
    MoveStatus,
};
