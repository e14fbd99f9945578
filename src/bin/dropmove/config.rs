use std::path::PathBuf;
use std::{fmt, fs};

use anyhow::{Context, Result};
use clap::ValueEnum;
use itertools::Itertools;
use serde::Deserialize;

use dropmove::pipeline::DEFAULT_COPY_SUFFIX;
use dropmove::{AppSettings, ConflictAction, OrganizationConfig};

use crate::Args;

/// How conflicts are resolved when the target path is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Ask for each conflicting file
    #[default]
    Ask,
    /// Keep both files by adding a copy suffix to the new one
    Rename,
    /// Replace the existing file
    Replace,
    /// Leave the file where it is
    Skip,
}

/// Final config combined from CLI arguments, user config file and saved settings.
#[derive(Debug)]
pub struct Config {
    pub(crate) paths: Vec<PathBuf>,
    pub(crate) stdin_name: Option<String>,
    pub(crate) destination: Option<PathBuf>,
    pub(crate) organization: OrganizationConfig,
    pub(crate) on_conflict: ConflictPolicy,
    pub(crate) copy_suffix: String,
    pub(crate) debug: bool,
    pub(crate) dryrun: bool,
    pub(crate) log: bool,
    pub(crate) save: bool,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
struct DropMoveConfig {
    #[serde(default)]
    copy_suffix: Option<String>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    log: bool,
    #[serde(default)]
    on_conflict: Option<ConflictPolicy>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    dropmove: DropMoveConfig,
}

impl ConflictPolicy {
    /// Fixed action for every conflict, `None` when the user should be asked.
    pub(crate) const fn action(self) -> Option<ConflictAction> {
        match self {
            Self::Ask => None,
            Self::Rename => Some(ConflictAction::Rename),
            Self::Replace => Some(ConflictAction::Replace),
            Self::Skip => Some(ConflictAction::Skip),
        }
    }
}

impl DropMoveConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    fn get_user_config() -> Result<Self> {
        let Some(path) = dropmove::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.dropmove)
            .with_context(|| "Failed to parse config TOML")
    }
}

impl Config {
    /// Create config from given command line args, user config file and saved settings.
    pub fn from_args(args: Args, settings: &AppSettings) -> Result<Self> {
        let user_config = DropMoveConfig::get_user_config()?;
        Ok(Self::from_parts(args, user_config, settings))
    }

    fn from_parts(args: Args, user_config: DropMoveConfig, settings: &AppSettings) -> Self {
        let paths: Vec<PathBuf> = args.paths.into_iter().unique().collect();

        let destination = args
            .dest
            .map(|dest| dunce::simplified(&dest).to_path_buf())
            .or_else(|| settings.destination());

        let mut organization = settings.organization;
        if args.organize {
            organization.enabled = true;
        }
        if args.no_organize {
            organization.enabled = false;
        }
        if args.no_product {
            organization.include_product = false;
        }
        if args.no_year {
            organization.include_year = false;
        }
        if args.no_month {
            organization.include_month = false;
        }
        if args.no_extension {
            organization.include_extension = false;
        }

        let copy_suffix = args
            .suffix
            .or(user_config.copy_suffix)
            .map(|suffix| suffix.trim().to_string())
            .filter(|suffix| !suffix.is_empty())
            .unwrap_or_else(|| DEFAULT_COPY_SUFFIX.to_string());

        Self {
            paths,
            stdin_name: args.stdin.map(|name| name.trim().to_string()).filter(|name| !name.is_empty()),
            destination,
            organization,
            on_conflict: args.on_conflict.or(user_config.on_conflict).unwrap_or_default(),
            copy_suffix,
            debug: args.debug || user_config.debug,
            dryrun: args.print || user_config.dryrun,
            log: args.log || user_config.log,
            save: args.save,
            verbose: args.verbose || user_config.verbose,
        }
    }

    /// Settings updated with the destination and organization of this run.
    pub(crate) fn updated_settings(&self, settings: &AppSettings) -> AppSettings {
        AppSettings {
            destination_folder: self
                .destination
                .as_deref()
                .map(dropmove::path_to_string)
                .unwrap_or_default(),
            organization: self.organization,
            ..settings.clone()
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(
            f,
            "  destination: {}",
            self.destination
                .as_deref()
                .map_or_else(|| "(not set)".to_string(), dropmove::path_to_string)
        )?;
        writeln!(f, "  on_conflict: {:?}", self.on_conflict)?;
        writeln!(f, "  copy_suffix: {}", self.copy_suffix)?;
        writeln!(f, "  dryrun:      {}", dropmove::colorize_bool(self.dryrun))?;
        writeln!(f, "  log:         {}", dropmove::colorize_bool(self.log))?;
        writeln!(f, "  save:        {}", dropmove::colorize_bool(self.save))?;
        writeln!(f, "  verbose:     {}", dropmove::colorize_bool(self.verbose))?;
        writeln!(f, "  paths:       {}", self.paths.len())?;
        if let Some(name) = &self.stdin_name {
            writeln!(f, "  stdin:       {name}")?;
        }
        write!(f, "{}", self.organization)
    }
}
