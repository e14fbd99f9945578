use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::organize::{OrganizationConfig, organize};
use crate::pipeline::{Conflict, ConflictAction, FileRef, Storage};
use crate::print_warning;

/// Find the files whose organized destination path is already taken.
///
/// A path is taken when it exists in the destination or when an earlier file of the same batch
/// maps to it. Probes run concurrently but the conflicts are returned in input order.
/// A failing probe is reported as a warning and counted as "no conflict" for that file,
/// the move itself will detect an existing target again at execution time.
pub async fn detect_conflicts(
    storage: &dyn Storage,
    files: &[FileRef],
    destination: &Path,
    config: &OrganizationConfig,
) -> Vec<Conflict> {
    let mut claimed = HashSet::with_capacity(files.len());
    let targets: Vec<(String, PathBuf, bool)> = files
        .iter()
        .map(|file| {
            let organized_path = organize(&file.name, config);
            let full_path = crate::join_relative(destination, &organized_path);
            let repeated = !claimed.insert(full_path.clone());
            (organized_path, full_path, repeated)
        })
        .collect();

    let probes = files
        .iter()
        .zip(targets)
        .enumerate()
        .map(|(position, (file, (organized_path, full_path, repeated)))| async move {
            let taken = if repeated {
                true
            } else {
                match storage.path_exists(&full_path).await {
                    Ok(exists) => exists,
                    Err(error) => {
                        print_warning!("Could not check {} for conflicts: {error}", full_path.display());
                        false
                    }
                }
            };
            taken.then(|| Conflict {
                file: file.clone(),
                position,
                organized_path,
                destination_path: full_path,
                action: ConflictAction::Pending,
            })
        });

    futures::future::join_all(probes).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod detect_tests {
    use super::*;

    use std::fs;

    use tempfile::tempdir;

    use crate::pipeline::LocalStorage;

    #[tokio::test]
    async fn repeated_target_in_batch_is_a_conflict() {
        let first_dir = tempdir().expect("Failed to create temp dir");
        let second_dir = tempdir().expect("Failed to create temp dir");
        let destination = tempdir().expect("Failed to create temp dir");
        fs::write(first_dir.path().join("x.txt"), b"first").expect("write");
        fs::write(second_dir.path().join("x.txt"), b"second").expect("write");
        let files = vec![
            FileRef::local(&first_dir.path().join("x.txt")).expect("file ref"),
            FileRef::local(&second_dir.path().join("x.txt")).expect("file ref"),
        ];

        let conflicts = detect_conflicts(
            &LocalStorage,
            &files,
            destination.path(),
            &OrganizationConfig::disabled(),
        )
        .await;

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].file, files[1]);
        assert_eq!(conflicts[0].position, 1);
        assert_eq!(conflicts[0].destination_path, destination.path().join("x.txt"));
    }

    #[tokio::test]
    async fn existing_target_is_a_conflict() {
        let destination = tempdir().expect("Failed to create temp dir");
        fs::write(destination.path().join("b.txt"), b"old").expect("write");
        let files = vec![
            FileRef::browser("a.txt", b"a".to_vec()),
            FileRef::browser("b.txt", b"b".to_vec()),
        ];

        let conflicts = detect_conflicts(
            &LocalStorage,
            &files,
            destination.path(),
            &OrganizationConfig::disabled(),
        )
        .await;

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].file.name, "b.txt");
        assert_eq!(conflicts[0].organized_path, "b.txt");
    }
}
