//! Organization options for the path organizer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which directory levels the organizer creates.
///
/// Serialized with the same keys the settings file has always used,
/// so `include_product` is stored as `product` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    pub enabled: bool,
    #[serde(rename = "product")]
    pub include_product: bool,
    #[serde(rename = "year")]
    pub include_year: bool,
    #[serde(rename = "month")]
    pub include_month: bool,
    #[serde(rename = "extension")]
    pub include_extension: bool,
}

impl OrganizationConfig {
    /// Organization enabled with every directory level included.
    #[must_use]
    pub const fn all_enabled() -> Self {
        Self {
            enabled: true,
            include_product: true,
            include_year: true,
            include_month: true,
            include_extension: true,
        }
    }

    /// Organization turned off: files go directly into the destination folder.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::all_enabled()
        }
    }
}

impl Default for OrganizationConfig {
    /// Levels are all selected but organizing itself is opt-in.
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Display for OrganizationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Organization:")?;
        writeln!(f, "  enabled:   {}", crate::colorize_bool(self.enabled))?;
        writeln!(f, "  product:   {}", crate::colorize_bool(self.include_product))?;
        writeln!(f, "  year:      {}", crate::colorize_bool(self.include_year))?;
        writeln!(f, "  month:     {}", crate::colorize_bool(self.include_month))?;
        write!(f, "  extension: {}", crate::colorize_bool(self.include_extension))
    }
}

#[cfg(test)]
mod organization_config_tests {
    use super::*;

    #[test]
    fn default_is_disabled_with_all_levels() {
        let config = OrganizationConfig::default();
        assert!(!config.enabled);
        assert!(config.include_product);
        assert!(config.include_year);
        assert!(config.include_month);
        assert!(config.include_extension);
    }

    #[test]
    fn deserializes_short_keys() {
        let json = r#"{"enabled": true, "product": false, "year": true, "month": false, "extension": true}"#;
        let config: OrganizationConfig = serde_json::from_str(json).expect("should parse");
        assert!(config.enabled);
        assert!(!config.include_product);
        assert!(config.include_year);
        assert!(!config.include_month);
        assert!(config.include_extension);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config: OrganizationConfig = serde_json::from_str(r#"{"enabled": true}"#).expect("should parse");
        assert_eq!(config, OrganizationConfig::all_enabled());
    }
}
