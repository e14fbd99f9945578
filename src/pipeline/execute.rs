//! Executing the move of a single file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::pipeline::storage::CopyFailure;
use crate::pipeline::{FileRef, FileSource, MoveError, MoveMode, MoveOptions, MoveResult, MoveStatus, Storage};
use crate::print_warning;

const WRITE_CHECK_PREFIX: &str = ".dropmove-write-test";
const WRITE_CHECK_ATTEMPTS: usize = 8;

static WRITE_CHECK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How the target path is claimed when something already exists there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Direct,
    Rename,
    Replace,
}

/// Move one file to `destination/organized_path` using the given mode.
///
/// Errors are captured into the returned result so a failing file never affects other files
/// of the same batch. Target directories are created before writing.
pub async fn move_one(
    storage: &dyn Storage,
    file: &FileRef,
    destination: &Path,
    organized_path: &str,
    mode: MoveMode,
    options: &MoveOptions,
) -> MoveResult {
    let placement = match mode {
        MoveMode::Skip => return MoveResult::skipped(&file.name),
        MoveMode::Direct => Placement::Direct,
        MoveMode::Rename => Placement::Rename,
        MoveMode::Replace => Placement::Replace,
    };

    match try_move(storage, file, destination, organized_path, placement, options).await {
        Ok((target, status)) => MoveResult::done(&file.name, target, status),
        Err(error) => MoveResult::failed(&file.name, error),
    }
}

async fn try_move(
    storage: &dyn Storage,
    file: &FileRef,
    destination: &Path,
    organized_path: &str,
    placement: Placement,
    options: &MoveOptions,
) -> Result<(PathBuf, MoveStatus), MoveError> {
    let target = crate::join_relative(destination, organized_path);

    if let FileSource::Local(source) = &file.source {
        check_source(storage, source).await?;
        if placement == Placement::Direct {
            check_destination_writable(storage, destination).await?;
        }
    }

    if let Some(parent) = target.parent() {
        storage
            .create_directories(parent)
            .await
            .map_err(|source| MoveError::DirectoryCreateFailed {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let target = match placement {
        Placement::Direct => {
            if target_exists(storage, &target).await? {
                return Err(MoveError::AlreadyExists(target));
            }
            target
        }
        Placement::Rename => free_target(storage, target, &options.copy_suffix).await?,
        Placement::Replace => {
            if target_exists(storage, &target).await? {
                storage
                    .delete_file(&target)
                    .await
                    .map_err(|error| MoveError::DestinationUnwritable {
                        path: target.clone(),
                        source: Some(error),
                    })?;
            }
            target
        }
    };

    let status = match &file.source {
        FileSource::Local(source) => transfer(storage, source, &target).await?,
        FileSource::Browser(payload) => {
            storage
                .write_bytes(&target, payload)
                .await
                .map_err(|source| write_error(&target, source))?;
            MoveStatus::Written
        }
    };

    Ok((target, status))
}

/// Rename when possible, otherwise copy and remove the source.
///
/// The copy never replaces an existing target. A copy that fails after creating the target
/// removes it again, so the file is either moved or left untouched.
/// If only the removal of the source fails the copy is kept and reported as such.
async fn transfer(storage: &dyn Storage, source: &Path, target: &Path) -> Result<MoveStatus, MoveError> {
    if storage.rename_or_move(source, target).await.is_ok() {
        return Ok(MoveStatus::Moved);
    }

    if let Err(failure) = storage.copy_stream(source, target).await {
        if failure.target_created()
            && let Err(error) = storage.delete_file(target).await
        {
            print_warning!("Failed to remove partial copy {}: {error}", target.display());
        }
        return Err(match failure {
            CopyFailure::Open(error) | CopyFailure::Read(error) => MoveError::ReadFailed {
                path: source.to_path_buf(),
                source: error,
            },
            CopyFailure::Create(error) | CopyFailure::Write(error) => write_error(target, error),
        });
    }

    match storage.delete_file(source).await {
        Ok(()) => Ok(MoveStatus::MovedByCopy),
        Err(_) => Ok(MoveStatus::CopiedSourceKept),
    }
}

/// A target taken between the existence check and the write is reported as a clash.
fn write_error(target: &Path, error: io::Error) -> MoveError {
    if error.kind() == io::ErrorKind::AlreadyExists {
        MoveError::AlreadyExists(target.to_path_buf())
    } else {
        MoveError::WriteFailed {
            path: target.to_path_buf(),
            source: error,
        }
    }
}

async fn check_source(storage: &dyn Storage, source: &Path) -> Result<(), MoveError> {
    let exists = storage
        .path_exists(source)
        .await
        .map_err(|error| MoveError::ReadFailed {
            path: source.to_path_buf(),
            source: error,
        })?;
    if !exists {
        return Err(MoveError::SourceNotFound(source.to_path_buf()));
    }

    let is_directory = storage
        .is_directory(source)
        .await
        .map_err(|error| MoveError::ReadFailed {
            path: source.to_path_buf(),
            source: error,
        })?;
    if is_directory {
        return Err(MoveError::UnsupportedFileSource(format!(
            "{} is a directory",
            source.display()
        )));
    }
    Ok(())
}

/// The destination folder must exist and accept a small test file.
///
/// Test file names are short and unique per call, and are created without replacing anything.
async fn check_destination_writable(storage: &dyn Storage, destination: &Path) -> Result<(), MoveError> {
    let unwritable = |source: Option<io::Error>| MoveError::DestinationUnwritable {
        path: destination.to_path_buf(),
        source,
    };

    match storage.is_directory(destination).await {
        Ok(true) => {}
        Ok(false) => return Err(unwritable(None)),
        Err(error) => return Err(unwritable(Some(error))),
    }

    let mut attempts = 0;
    let check_file = loop {
        let check_file = destination.join(write_check_file_name());
        match storage.write_bytes(&check_file, b"test").await {
            Ok(()) => break check_file,
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists && attempts < WRITE_CHECK_ATTEMPTS => {
                attempts += 1;
            }
            Err(error) => return Err(unwritable(Some(error))),
        }
    };

    match storage.delete_file(&check_file).await {
        Err(error) if error.kind() != io::ErrorKind::NotFound => Err(unwritable(Some(error))),
        _ => Ok(()),
    }
}

fn write_check_file_name() -> String {
    let counter = WRITE_CHECK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{WRITE_CHECK_PREFIX}-{}-{counter}", std::process::id())
}

async fn target_exists(storage: &dyn Storage, target: &Path) -> Result<bool, MoveError> {
    storage
        .path_exists(target)
        .await
        .map_err(|error| MoveError::DestinationUnwritable {
            path: target.to_path_buf(),
            source: Some(error),
        })
}

/// First free path of `stem_<suffix>_<n>.ext` in the target directory, counting from 1.
///
/// Returns the target itself when it is not taken.
async fn free_target(storage: &dyn Storage, target: PathBuf, suffix: &str) -> Result<PathBuf, MoveError> {
    if !target_exists(storage, &target).await? {
        return Ok(target);
    }

    let stem = crate::os_str_to_string(target.file_stem().unwrap_or_default());
    let extension = target
        .extension()
        .map(|extension| format!(".{}", crate::os_str_to_string(extension)))
        .unwrap_or_default();

    let mut counter: u32 = 1;
    loop {
        let candidate = target.with_file_name(copy_file_name(&stem, suffix, counter, &extension));
        if !target_exists(storage, &candidate).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn copy_file_name(stem: &str, suffix: &str, counter: u32, extension: &str) -> String {
    format!("{stem}_{suffix}_{counter}{extension}")
}
