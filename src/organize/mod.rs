//! Filename-driven path organizer.
//!
//! Files following the `product_title_YYYYMMDD[_vX].ext` naming convention are sorted into a
//! `Product/Year/Month/EXTs` directory tree below the destination folder.
//! Which levels are created is controlled by [`OrganizationConfig`].

mod config;
mod name;
mod path;

pub use config::OrganizationConfig;
pub use name::{NameParts, ParsedName};
pub use path::{folder_structure_preview, organize};
