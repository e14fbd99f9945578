//! Batch state machine tying conflict detection and file moves together.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::organize::{OrganizationConfig, organize};
use crate::pipeline::{
    BatchReport, Conflict, ConflictAction, FileRef, MoveError, MoveMode, MoveOptions, Storage, detect_conflicts,
    move_one,
};
use crate::settings::AppSettings;

/// Where the pipeline is in processing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Checking,
    AwaitingResolution,
    Resolving,
    Moving,
}

/// What happened after submitting a batch.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// No conflicts, every file was moved directly.
    Completed(BatchReport),
    /// Some targets are taken: resolve each conflict, then call [`MovePipeline::run_move_batch`].
    Conflicts(Vec<Conflict>),
}

/// Moves batches of files into the destination folder, one batch at a time.
pub struct MovePipeline {
    storage: Arc<dyn Storage>,
    destination: Option<PathBuf>,
    organization: OrganizationConfig,
    options: MoveOptions,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: BatchState,
    files: Vec<FileRef>,
    conflicts: Vec<Conflict>,
}

/// Marks a batch as in flight. Dropping an unfinished token returns the pipeline to idle.
struct StateToken<'a> {
    inner: &'a Mutex<Inner>,
    finished: bool,
}

impl MovePipeline {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, destination: Option<PathBuf>, organization: OrganizationConfig) -> Self {
        Self {
            storage,
            destination,
            organization,
            options: MoveOptions::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a pipeline using the destination and organization from saved settings.
    #[must_use]
    pub fn from_settings(storage: Arc<dyn Storage>, settings: &AppSettings) -> Self {
        Self::new(storage, settings.destination(), settings.organization)
    }

    #[must_use]
    pub fn with_options(mut self, options: MoveOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    #[must_use]
    pub const fn organization(&self) -> &OrganizationConfig {
        &self.organization
    }

    #[must_use]
    pub fn state(&self) -> BatchState {
        self.lock().state
    }

    /// Files of the last batch that has not completed successfully.
    #[must_use]
    pub fn working_files(&self) -> Vec<FileRef> {
        self.lock().files.clone()
    }

    /// Conflicts waiting for a decision.
    #[must_use]
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.lock().conflicts.clone()
    }

    /// Organized path of a file relative to the destination folder.
    #[must_use]
    pub fn organized_path(&self, file_name: &str) -> String {
        organize(file_name, &self.organization)
    }

    /// Submit a batch of files.
    ///
    /// Without conflicts every file is moved concurrently and the report is returned.
    /// With conflicts the pipeline waits for a decision on each of them.
    /// Submitting while conflicts are pending replaces them with the new batch.
    ///
    /// # Errors
    /// `DestinationMissing`, `NothingToMove` or `Busy`, all returned before any I/O.
    pub async fn submit_batch(&self, files: Vec<FileRef>) -> Result<SubmitOutcome, MoveError> {
        let destination = self.destination.as_deref().ok_or(MoveError::DestinationMissing)?;
        if files.is_empty() {
            return Err(MoveError::NothingToMove);
        }

        let token = self.begin(
            |state| matches!(state, BatchState::Idle | BatchState::AwaitingResolution),
            BatchState::Checking,
        )?;
        {
            let mut inner = self.lock();
            inner.files.clone_from(&files);
            inner.conflicts.clear();
        }

        let conflicts = detect_conflicts(self.storage.as_ref(), &files, destination, &self.organization).await;
        if !conflicts.is_empty() {
            let pending = conflicts.clone();
            token.finish(move |inner| {
                inner.conflicts = pending;
                inner.state = BatchState::AwaitingResolution;
            });
            return Ok(SubmitOutcome::Conflicts(conflicts));
        }

        token.set(BatchState::Moving);
        let report = self.move_concurrently(&files, destination).await;
        let all_handled = report.all_handled();
        token.finish(|inner| {
            if all_handled {
                inner.files.clear();
            }
            inner.state = BatchState::Idle;
        });
        Ok(SubmitOutcome::Completed(report))
    }

    /// Set the action for the conflict at `index`.
    ///
    /// # Errors
    /// `NoPendingConflicts` when not waiting for decisions, `Busy` while a batch is running,
    /// or `ConflictIndexOutOfRange`.
    pub fn resolve_conflict(&self, index: usize, action: ConflictAction) -> Result<(), MoveError> {
        let mut inner = self.lock();
        Self::ensure_awaiting(inner.state)?;
        let count = inner.conflicts.len();
        let conflict = inner
            .conflicts
            .get_mut(index)
            .ok_or(MoveError::ConflictIndexOutOfRange { index, count })?;
        conflict.action = action;
        Ok(())
    }

    /// Set the action for every conflict still pending. Returns how many were set.
    ///
    /// # Errors
    /// `NoPendingConflicts` when not waiting for decisions, `Busy` while a batch is running.
    pub fn resolve_all(&self, action: ConflictAction) -> Result<usize, MoveError> {
        let mut inner = self.lock();
        Self::ensure_awaiting(inner.state)?;
        let mut count = 0;
        for conflict in inner.conflicts.iter_mut().filter(|c| c.action.is_pending()) {
            conflict.action = action;
            count += 1;
        }
        Ok(count)
    }

    /// Drop the pending conflicts and return to idle. The working file list is kept.
    ///
    /// # Errors
    /// `NoPendingConflicts` when not waiting for decisions, `Busy` while a batch is running.
    pub fn cancel_resolution(&self) -> Result<(), MoveError> {
        let mut inner = self.lock();
        Self::ensure_awaiting(inner.state)?;
        inner.conflicts.clear();
        inner.state = BatchState::Idle;
        Ok(())
    }

    /// Move the batch after every conflict has been resolved.
    ///
    /// Files are processed one at a time in submission order. Conflicting files use their
    /// chosen action, the remaining files are moved directly.
    ///
    /// # Errors
    /// `UnresolvedConflicts` if any conflict is still pending, `NoPendingConflicts` or `Busy`
    /// if the pipeline is not waiting for decisions.
    pub async fn run_move_batch(&self) -> Result<BatchReport, MoveError> {
        let destination = self.destination.as_deref().ok_or(MoveError::DestinationMissing)?;

        let (token, files, conflicts) = {
            let mut inner = self.lock();
            Self::ensure_awaiting(inner.state)?;
            let pending = inner.conflicts.iter().filter(|c| c.action.is_pending()).count();
            if pending > 0 {
                return Err(MoveError::UnresolvedConflicts(pending));
            }
            inner.state = BatchState::Resolving;
            let files = inner.files.clone();
            let conflicts = std::mem::take(&mut inner.conflicts);
            drop(inner);
            (StateToken::new(&self.inner), files, conflicts)
        };

        token.set(BatchState::Moving);
        let mut conflicts = conflicts.into_iter().peekable();
        let mut results = Vec::with_capacity(files.len());
        for (position, file) in files.iter().enumerate() {
            let conflict = conflicts.next_if(|conflict| conflict.position == position);
            let (organized_path, mode) = match conflict {
                Some(conflict) => (
                    conflict.organized_path,
                    conflict.action.mode().unwrap_or(MoveMode::Direct),
                ),
                None => (self.organized_path(&file.name), MoveMode::Direct),
            };
            let result = move_one(
                self.storage.as_ref(),
                file,
                destination,
                &organized_path,
                mode,
                &self.options,
            )
            .await;
            results.push(result);
        }

        let report = BatchReport::new(results);
        let all_handled = report.all_handled();
        token.finish(|inner| {
            if all_handled {
                inner.files.clear();
            }
            inner.state = BatchState::Idle;
        });
        Ok(report)
    }

    /// Dispatch every file at once and wait for all of them.
    async fn move_concurrently(&self, files: &[FileRef], destination: &Path) -> BatchReport {
        let moves = files.iter().map(|file| async move {
            let organized_path = self.organized_path(&file.name);
            move_one(
                self.storage.as_ref(),
                file,
                destination,
                &organized_path,
                MoveMode::Direct,
                &self.options,
            )
            .await
        });
        BatchReport::new(futures::future::join_all(moves).await)
    }

    /// Enter `next` if the current state is accepted, otherwise the pipeline is busy.
    fn begin(&self, accepted: impl Fn(BatchState) -> bool, next: BatchState) -> Result<StateToken<'_>, MoveError> {
        let mut inner = self.lock();
        if !accepted(inner.state) {
            return Err(MoveError::Busy);
        }
        inner.state = next;
        drop(inner);
        Ok(StateToken::new(&self.inner))
    }

    fn ensure_awaiting(state: BatchState) -> Result<(), MoveError> {
        match state {
            BatchState::AwaitingResolution => Ok(()),
            BatchState::Idle => Err(MoveError::NoPendingConflicts),
            BatchState::Checking | BatchState::Resolving | BatchState::Moving => Err(MoveError::Busy),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MovePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovePipeline")
            .field("destination", &self.destination)
            .field("organization", &self.organization)
            .field("options", &self.options)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::AwaitingResolution => "awaiting resolution",
            Self::Resolving => "resolving",
            Self::Moving => "moving",
        };
        write!(f, "{name}")
    }
}

impl<'a> StateToken<'a> {
    const fn new(inner: &'a Mutex<Inner>) -> Self {
        Self { inner, finished: false }
    }

    fn lock(&self) -> MutexGuard<'a, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: BatchState) {
        self.lock().state = state;
    }

    /// Apply the final update for the batch while holding the lock.
    fn finish(mut self, update: impl FnOnce(&mut Inner)) {
        let mut inner = self.lock();
        update(&mut *inner);
        self.finished = true;
    }
}

impl Drop for StateToken<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.lock().state = BatchState::Idle;
        }
    }
}
