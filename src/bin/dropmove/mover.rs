use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::io::AsyncReadExt;

use dropmove::{
    AppSettings, BatchReport, Conflict, ConflictAction, FileRef, LocalStorage, MoveOptions, MovePipeline,
    SubmitOutcome, print_bold, print_error, print_warning,
};

use crate::Args;
use crate::config::{Config, ConflictPolicy};
use crate::logger::MoveLogger;

pub struct DropMove {
    config: Config,
    settings: AppSettings,
}

impl DropMove {
    pub fn new(args: Args) -> Result<Self> {
        let settings = AppSettings::load()?.unwrap_or_default();
        let config = Config::from_args(args, &settings)?;
        Ok(Self { config, settings })
    }

    pub async fn run(&self) -> Result<()> {
        if self.config.debug {
            println!("{}", self.config);
        }
        if self.config.stdin_name.is_some() && self.config.on_conflict == ConflictPolicy::Ask && !self.config.dryrun {
            anyhow::bail!("Reading content from stdin requires --on-conflict to be rename, replace or skip");
        }

        if self.config.save {
            let path = self.config.updated_settings(&self.settings).save()?;
            println!("Settings saved to: {}", path.display());
        }

        let files = self.gather_files().await?;
        if files.is_empty() {
            if self.config.save {
                return Ok(());
            }
            anyhow::bail!("No files to move");
        }

        let destination = self
            .config
            .destination
            .as_deref()
            .context("No destination folder set, use --dest or save one with --save")?;

        let run_settings = self.config.updated_settings(&self.settings);
        let pipeline = MovePipeline::from_settings(Arc::new(LocalStorage), &run_settings).with_options(MoveOptions {
            copy_suffix: self.config.copy_suffix.clone(),
        });

        let mut logger = if self.config.log && !self.config.dryrun {
            let mut logger = MoveLogger::new()?;
            logger.log_init(&self.config);
            Some(logger)
        } else {
            None
        };

        self.print_plan(&pipeline, &files, &destination.display().to_string());

        if self.config.dryrun {
            return Self::print_conflicts_only(&pipeline, &files).await;
        }

        let report = match pipeline.submit_batch(files).await? {
            SubmitOutcome::Completed(report) => report,
            SubmitOutcome::Conflicts(conflicts) => {
                self.resolve_conflicts(&pipeline, &conflicts)?;
                if let Some(logger) = logger.as_mut() {
                    logger.log_conflicts(&pipeline.conflicts());
                }
                pipeline.run_move_batch().await?
            }
        };

        if let Some(logger) = logger.as_mut() {
            logger.log_report(&report);
        }
        self.print_report(&report);

        if report.all_handled() {
            Ok(())
        } else {
            anyhow::bail!("{} file(s) could not be moved", report.failed())
        }
    }

    /// Collect local files from the given paths and an optional stdin payload.
    async fn gather_files(&self) -> Result<Vec<FileRef>> {
        let mut files: Vec<FileRef> = Vec::with_capacity(self.config.paths.len() + 1);
        for path in &self.config.paths {
            match FileRef::local(path) {
                Ok(file) => files.push(file),
                Err(error) => print_error!("{error}"),
            }
        }

        if let Some(name) = &self.config.stdin_name {
            let mut payload = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut payload)
                .await
                .context("Failed to read stdin")?;
            files.push(FileRef::browser(name.clone(), payload));
        }

        Ok(files)
    }

    fn print_plan(&self, pipeline: &MovePipeline, files: &[FileRef], destination: &str) {
        print_bold!("Moving {} file(s) to {destination}", files.len());
        if self.config.organization.enabled && self.config.verbose {
            println!(
                "{}",
                dropmove::folder_structure_preview(&self.config.organization).dimmed()
            );
        }
        for file in files {
            let organized = pipeline.organized_path(&file.name);
            if self.config.verbose {
                let source = file
                    .path()
                    .map_or_else(|| "stdin".to_string(), |path| path.display().to_string());
                println!(
                    "  {source} -> {} ({})",
                    organized.cyan(),
                    dropmove::format_size(file.size)
                );
            } else if organized != file.name {
                println!("  {} -> {}", file.name, organized.cyan());
            }
        }
    }

    async fn print_conflicts_only(pipeline: &MovePipeline, files: &[FileRef]) -> Result<()> {
        let Some(destination) = pipeline.destination() else {
            return Ok(());
        };
        let conflicts =
            dropmove::detect_conflicts(&LocalStorage, files, destination, pipeline.organization()).await;
        if conflicts.is_empty() {
            println!("{}", "No conflicts".green());
        } else {
            print_warning!("{} file(s) would collide with an existing or repeated target:", conflicts.len());
            for conflict in &conflicts {
                println!("  {}", conflict.destination_path.display());
            }
        }
        println!("Dryrun: would have moved {} file(s)", files.len());
        Ok(())
    }

    /// Decide every conflict either from the configured policy or by asking the user.
    fn resolve_conflicts(&self, pipeline: &MovePipeline, conflicts: &[Conflict]) -> Result<()> {
        print_warning!("{} file(s) collide with an existing or repeated target", conflicts.len());

        if let Some(action) = self.config.on_conflict.action() {
            let count = pipeline.resolve_all(action)?;
            if self.config.verbose {
                println!("Applied '{action}' to {count} conflict(s)");
            }
            return Ok(());
        }

        for (index, conflict) in conflicts.iter().enumerate() {
            let action = match Self::ask_action(conflict) {
                Ok(action) => action,
                Err(error) => {
                    pipeline.cancel_resolution()?;
                    return Err(error);
                }
            };
            pipeline.resolve_conflict(index, action)?;
        }
        Ok(())
    }

    /// Prompt until a valid action is given. End of input skips the file.
    fn ask_action(conflict: &Conflict) -> Result<ConflictAction> {
        println!("{}", conflict.destination_path.display().to_string().yellow());
        loop {
            print!("{}", "[r]ename, [o]verwrite or [s]kip: ".magenta());
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                println!();
                return Ok(ConflictAction::Skip);
            }
            match input.parse::<ConflictAction>() {
                Ok(action) => return Ok(action),
                Err(error) => print_error!("{error}"),
            }
        }
    }

    fn print_report(&self, report: &BatchReport) {
        for result in &report.results {
            if !result.success() {
                print_error!("{}: {}", result.file_name, result.message());
            } else if self.config.verbose {
                let target = result
                    .target
                    .as_deref()
                    .map_or_else(String::new, |path| format!(" -> {}", path.display()));
                println!("{}{target}: {}", result.file_name, result.message().green());
            }
        }

        let summary = report.to_string();
        if report.all_handled() {
            println!("{}", summary.green());
        } else {
            println!("{}", summary.red());
        }
    }
}
