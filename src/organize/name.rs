//! Parsing of the `product_title_YYYYMMDD[_vX].ext` naming convention.

/// Fields extracted from a conventionally named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts<'a> {
    pub product: &'a str,
    pub title: &'a str,
    /// First four characters of the date token.
    pub year: &'a str,
    /// Characters five and six of the date token.
    pub month: &'a str,
    /// Upper-cased extension without the leading dot.
    pub extension: String,
    /// Version token such as `v2`, only present in the four part form.
    pub version: Option<&'a str>,
}

/// Result of matching a filename against the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName<'a> {
    Matched(NameParts<'a>),
    Unmatched,
}

impl<'a> ParsedName<'a> {
    /// Parse a filename.
    ///
    /// Only names with exactly three or four `_`-separated parts match:
    /// `product_title_YYYYMMDD.ext` and `product_title_YYYYMMDD_vX.ext`.
    /// The date token is not validated, short tokens give a truncated or empty year and month.
    #[must_use]
    pub fn parse(file_name: &'a str) -> Self {
        let parts: Vec<&str> = file_name.split('_').collect();
        match parts.as_slice() {
            [product, title, date_and_extension] => {
                let (date, extension) = split_token_and_extension(date_and_extension);
                Self::Matched(NameParts::new(product, title, date, extension, None))
            }
            [product, title, date, version_and_extension] => {
                let (version, extension) = split_token_and_extension(version_and_extension);
                Self::Matched(NameParts::new(product, title, date, extension, Some(version)))
            }
            _ => Self::Unmatched,
        }
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

impl<'a> NameParts<'a> {
    fn new(product: &'a str, title: &'a str, date: &'a str, extension: &str, version: Option<&'a str>) -> Self {
        Self {
            product,
            title,
            year: char_slice(date, 0, 4),
            month: char_slice(date, 4, 6),
            extension: extension.to_uppercase(),
            version,
        }
    }
}

/// Split `token.ext` into the token and the piece directly after the first dot.
///
/// `v2.tar.gz` gives `("v2", "tar")`, a token without a dot has an empty extension.
fn split_token_and_extension(segment: &str) -> (&str, &str) {
    let mut pieces = segment.split('.');
    let token = pieces.next().unwrap_or_default();
    let extension = pieces.next().unwrap_or_default();
    (token, extension)
}

/// Substring by character positions, clamped to the string length.
fn char_slice(value: &str, start: usize, end: usize) -> &str {
    let byte_index = |position: usize| {
        value
            .char_indices()
            .nth(position)
            .map_or(value.len(), |(index, _)| index)
    };
    let start = byte_index(start);
    let end = byte_index(end);
    &value[start..end]
}

#[cfg(test)]
mod parsed_name_tests {
    use super::*;

    #[test]
    fn three_part_name() {
        let parsed = ParsedName::parse("Acme_Launch_20250906.png");
        assert_eq!(
            parsed,
            ParsedName::Matched(NameParts {
                product: "Acme",
                title: "Launch",
                year: "2025",
                month: "09",
                extension: "PNG".to_string(),
                version: None,
            })
        );
    }

    #[test]
    fn four_part_name_has_version() {
        let ParsedName::Matched(parts) = ParsedName::parse("Acme_Launch_20250906_v2.psd") else {
            panic!("expected a match");
        };
        assert_eq!(parts.version, Some("v2"));
        assert_eq!(parts.extension, "PSD");
        assert_eq!(parts.year, "2025");
        assert_eq!(parts.month, "09");
    }

    #[test]
    fn too_few_parts_is_unmatched() {
        assert_eq!(ParsedName::parse("onlyonepart.txt"), ParsedName::Unmatched);
        assert_eq!(ParsedName::parse("two_parts.txt"), ParsedName::Unmatched);
    }

    #[test]
    fn too_many_parts_is_unmatched() {
        assert!(!ParsedName::parse("a_b_20250906_v2_final.png").is_match());
    }

    #[test]
    fn short_date_token_is_truncated() {
        let ParsedName::Matched(parts) = ParsedName::parse("A_B_2025.png") else {
            panic!("expected a match");
        };
        assert_eq!(parts.year, "2025");
        assert_eq!(parts.month, "");

        let ParsedName::Matched(parts) = ParsedName::parse("A_B_20.png") else {
            panic!("expected a match");
        };
        assert_eq!(parts.year, "20");
        assert_eq!(parts.month, "");
    }

    #[test]
    fn missing_extension_is_empty() {
        let ParsedName::Matched(parts) = ParsedName::parse("A_B_20250906") else {
            panic!("expected a match");
        };
        assert_eq!(parts.extension, "");
        assert_eq!(parts.month, "09");
    }

    #[test]
    fn only_first_extension_piece_is_used() {
        let ParsedName::Matched(parts) = ParsedName::parse("A_B_20250906.tar.gz") else {
            panic!("expected a match");
        };
        assert_eq!(parts.extension, "TAR");
    }

    #[test]
    fn multibyte_date_token_does_not_panic() {
        let ParsedName::Matched(parts) = ParsedName::parse("A_B_ñññññññ.png") else {
            panic!("expected a match");
        };
        assert_eq!(parts.year, "ññññ");
        assert_eq!(parts.month, "ññ");
    }
}
