//! Filesystem collaborator used by the move pipeline.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Failure of a streamed copy, split by the side that failed and by whether the target was created.
#[derive(Debug)]
pub enum CopyFailure {
    /// The source could not be opened. Nothing was written.
    Open(io::Error),
    /// The target could not be created, for example because it already exists.
    Create(io::Error),
    /// Reading failed after the target was created.
    Read(io::Error),
    /// Writing failed after the target was created.
    Write(io::Error),
}

impl CopyFailure {
    /// True when a partial target file was left behind by this copy.
    #[must_use]
    pub const fn target_created(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_))
    }
}

/// Filesystem operations the pipeline needs.
///
/// Every method is a suspension point of the pipeline.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn path_exists(&self, path: &Path) -> io::Result<bool>;

    async fn is_directory(&self, path: &Path) -> io::Result<bool>;

    /// Create a directory and all of its parents. Succeeds if it already exists.
    async fn create_directories(&self, path: &Path) -> io::Result<()>;

    /// Atomic rename, expected to fail across volumes.
    async fn rename_or_move(&self, source: &Path, destination: &Path) -> io::Result<()>;

    /// Stream the content of `source` into a new file at `destination`. Returns bytes copied.
    /// Fails without touching `destination` if it already exists.
    async fn copy_stream(&self, source: &Path, destination: &Path) -> Result<u64, CopyFailure>;

    async fn delete_file(&self, path: &Path) -> io::Result<()>;

    /// Write a new file. Fails with `AlreadyExists` if the path is taken.
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`Storage`] backed by the local filesystem through `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[async_trait]
impl Storage for LocalStorage {
    async fn path_exists(&self, path: &Path) -> io::Result<bool> {
        fs::try_exists(path).await
    }

    async fn is_directory(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path).await?.is_dir())
    }

    async fn create_directories(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn rename_or_move(&self, source: &Path, destination: &Path) -> io::Result<()> {
        fs::rename(source, destination).await
    }

    async fn copy_stream(&self, source: &Path, destination: &Path) -> Result<u64, CopyFailure> {
        let mut reader = fs::File::open(source).await.map_err(CopyFailure::Open)?;
        let mut writer = create_new(destination).await.map_err(CopyFailure::Create)?;

        let mut buffer = vec![0_u8; 64 * 1024];
        let mut total = 0_u64;
        loop {
            let read = reader.read(&mut buffer).await.map_err(CopyFailure::Read)?;
            if read == 0 {
                break;
            }
            writer.write_all(&buffer[..read]).await.map_err(CopyFailure::Write)?;
            total += read as u64;
        }
        writer.flush().await.map_err(CopyFailure::Write)?;
        writer.sync_all().await.map_err(CopyFailure::Write)?;
        Ok(total)
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = create_new(path).await?;
        file.write_all(bytes).await?;
        file.flush().await
    }
}

async fn create_new(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path).await
}

#[cfg(test)]
mod local_storage_tests {
    use super::*;

    use tempfile::tempdir;

    #[tokio::test]
    async fn copy_stream_copies_content() {
        let dir = tempdir().expect("Failed to create temp dir");
        let source = dir.path().join("source.bin");
        let target = dir.path().join("target.bin");
        let content: Vec<u8> = (0..200_000_u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&source, &content).expect("Failed to write source");

        let copied = LocalStorage.copy_stream(&source, &target).await.expect("copy should succeed");
        assert_eq!(copied, content.len() as u64);
        assert_eq!(std::fs::read(&target).expect("Failed to read target"), content);
        assert!(source.exists());
    }

    #[tokio::test]
    async fn copy_stream_missing_source_is_open_failure() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = LocalStorage
            .copy_stream(&dir.path().join("missing"), &dir.path().join("target"))
            .await;
        let failure = result.expect_err("copy should fail");
        assert!(matches!(failure, CopyFailure::Open(_)));
        assert!(!failure.target_created());
        assert!(!dir.path().join("target").exists());
    }

    #[tokio::test]
    async fn copy_stream_keeps_existing_target() {
        let dir = tempdir().expect("Failed to create temp dir");
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        std::fs::write(&source, "new").expect("Failed to write source");
        std::fs::write(&target, "existing").expect("Failed to write target");

        let failure = LocalStorage
            .copy_stream(&source, &target)
            .await
            .expect_err("copy should not overwrite");

        assert!(matches!(failure, CopyFailure::Create(_)));
        assert!(!failure.target_created());
        assert_eq!(std::fs::read_to_string(&target).expect("read target"), "existing");
    }

    #[tokio::test]
    async fn write_bytes_does_not_overwrite() {
        let dir = tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("file.txt");
        LocalStorage.write_bytes(&file, b"first").await.expect("write");

        let error = LocalStorage
            .write_bytes(&file, b"second")
            .await
            .expect_err("second write should fail");

        assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&file).expect("read"), b"first");
    }

    #[tokio::test]
    async fn create_directories_is_idempotent() {
        let dir = tempdir().expect("Failed to create temp dir");
        let nested = dir.path().join("a/b/c");
        LocalStorage.create_directories(&nested).await.expect("first create");
        LocalStorage.create_directories(&nested).await.expect("second create");
        assert!(LocalStorage.is_directory(&nested).await.expect("metadata"));
    }

    #[tokio::test]
    async fn path_exists_reports_presence() {
        let dir = tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("file.txt");
        assert!(!LocalStorage.path_exists(&file).await.expect("probe"));
        LocalStorage.write_bytes(&file, b"data").await.expect("write");
        assert!(LocalStorage.path_exists(&file).await.expect("probe"));
        LocalStorage.delete_file(&file).await.expect("delete");
        assert!(!LocalStorage.path_exists(&file).await.expect("probe"));
    }
}
