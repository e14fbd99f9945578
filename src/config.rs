use std::path::PathBuf;
use std::sync::LazyLock;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/dropmove.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Path to the persisted app settings: `<user config dir>/dropmove/settings.json`
///
/// Returns `None` if the platform config directory cannot be determined.
pub static SETTINGS_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join(PROJECT_NAME).join("settings.json"))
});

/// Directory for move log files: `$HOME/logs/dropmove`
pub static LOG_DIR: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join("logs").join(PROJECT_NAME))
});
