//! Build the organized relative destination path for a file.

use crate::organize::{OrganizationConfig, ParsedName};

/// Map a filename to its destination path relative to the destination folder.
///
/// Directory levels are added in a fixed order: product, year, month and `{EXT}s`.
/// A level is only added when it is enabled and its value is not empty.
/// Names not following the convention are returned unchanged, so this never fails.
///
/// ```rust
/// use dropmove::{OrganizationConfig, organize};
///
/// let config = OrganizationConfig::all_enabled();
/// assert_eq!(organize("A_B_20250906.png", &config), "A/2025/09/PNGs/A_B_20250906.png");
/// assert_eq!(organize("notes.txt", &config), "notes.txt");
/// ```
#[must_use]
pub fn organize(file_name: &str, config: &OrganizationConfig) -> String {
    if !config.enabled {
        return file_name.to_string();
    }

    let ParsedName::Matched(parts) = ParsedName::parse(file_name) else {
        return file_name.to_string();
    };

    let extension_dir = (!parts.extension.is_empty()).then(|| format!("{}s", parts.extension));
    let levels = [
        (config.include_product, Some(parts.product)),
        (config.include_year, Some(parts.year)),
        (config.include_month, Some(parts.month)),
        (config.include_extension, extension_dir.as_deref()),
    ];

    let directories: Vec<&str> = levels
        .into_iter()
        .filter_map(|(include, value)| value.filter(|value| include && is_usable_directory(value)))
        .collect();

    if directories.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{file_name}", directories.join("/"))
    }
}

/// Template of the directory tree produced with the given config, used for previews.
///
/// ```rust
/// use dropmove::{OrganizationConfig, folder_structure_preview};
///
/// let config = OrganizationConfig {
///     include_month: false,
///     ..OrganizationConfig::all_enabled()
/// };
/// assert_eq!(folder_structure_preview(&config), "Client/Year/FileType/file.ext");
/// ```
#[must_use]
pub fn folder_structure_preview(config: &OrganizationConfig) -> String {
    [
        (config.include_product, "Client"),
        (config.include_year, "Year"),
        (config.include_month, "Month"),
        (config.include_extension, "FileType"),
        (true, "file.ext"),
    ]
    .into_iter()
    .filter_map(|(include, level)| include.then_some(level))
    .collect::<Vec<_>>()
    .join("/")
}

/// Empty and dot-only values would not add a directory level or would escape the destination.
fn is_usable_directory(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".."
}
