use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use chrono::Local;

use dropmove::{BatchReport, Conflict, MoveResult};

use crate::config::Config;

/// Simple file logger for move operations with buffered writes
pub struct MoveLogger {
    writer: BufWriter<File>,
}

impl MoveLogger {
    /// Create a new file logger, writing to ~/logs/dropmove/dropmove_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let log_dir = dropmove::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;

        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("dropmove_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, config: &Config) {
        let destination = config
            .destination
            .as_deref()
            .map_or_else(String::new, dropmove::path_to_string);
        let _ = writeln!(self.writer, "[{}] INIT \"{destination}\"", Self::timestamp());
        let _ = writeln!(self.writer, "  organize: {}", config.organization.enabled);
        if config.organization.enabled {
            let _ = writeln!(
                self.writer,
                "  structure: {}",
                dropmove::folder_structure_preview(&config.organization)
            );
        }
        let _ = writeln!(self.writer, "  on_conflict: {:?}", config.on_conflict);
        let _ = writeln!(self.writer, "  copy_suffix: {}", config.copy_suffix);
        let _ = writeln!(self.writer, "  files: {}", config.paths.len());
        let _ = self.writer.flush();
    }

    /// Log the chosen action for each conflict
    pub(crate) fn log_conflicts(&mut self, conflicts: &[Conflict]) {
        for conflict in conflicts {
            let origin = if conflict.file.is_browser() { " (stdin)" } else { "" };
            let _ = writeln!(
                self.writer,
                "[{}] CONFLICT \"{}\"{origin} -> \"{}\" | {}",
                Self::timestamp(),
                conflict.file.name,
                conflict.destination_path.display(),
                conflict.action
            );
        }
        let _ = self.writer.flush();
    }

    /// Log the outcome of a single file
    pub(crate) fn log_result(&mut self, result: &MoveResult) {
        let target = result
            .target
            .as_deref()
            .map_or_else(String::new, |path| format!(" -> \"{}\"", path.display()));
        let label = if !result.success() {
            "ERROR  "
        } else if result.is_skipped() {
            "SKIP   "
        } else {
            "SUCCESS"
        };
        let _ = writeln!(
            self.writer,
            "[{}] {label} \"{}\"{target} | {}",
            Self::timestamp(),
            result.file_name,
            result.message()
        );
        let _ = self.writer.flush();
    }

    /// Log final statistics
    pub(crate) fn log_report(&mut self, report: &BatchReport) {
        for result in &report.results {
            self.log_result(result);
        }
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Files moved:   {}", report.succeeded());
        let _ = writeln!(self.writer, "  Files skipped: {}", report.skipped());
        let _ = writeln!(self.writer, "  Files failed:  {}", report.failed());
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}
