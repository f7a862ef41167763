//! Output path template

use photo_fs::NormalizedPath;
use regex::Regex;

use crate::{Error, Result};

const PLACEHOLDERS: [&str; 3] = ["category", "album_slug", "filename"];

/// Validated `general.output_pattern`, e.g. `{category}/{album_slug}/{filename}`.
///
/// Rendered paths are relative to the output base inside the site repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    pattern: String,
}

impl OutputTemplate {
    /// Parse and validate a pattern.
    ///
    /// The pattern must contain `{filename}`, may only use the `{category}`,
    /// `{album_slug}` and `{filename}` placeholders, and must not contain `..`
    /// segments or start at a filesystem root.
    pub fn parse(pattern: &str) -> Result<Self> {
        let placeholder = Regex::new(r"\{([^{}]*)\}").map_err(|e| Error::config(e.to_string()))?;
        for caps in placeholder.captures_iter(pattern) {
            let name = &caps[1];
            if !PLACEHOLDERS.contains(&name) {
                return Err(Error::config(format!(
                    "Unknown placeholder {{{name}}} in output_pattern {pattern:?}"
                )));
            }
        }
        if !pattern.contains("{filename}") {
            return Err(Error::config(format!(
                "output_pattern {pattern:?} must contain {{filename}}"
            )));
        }
        let normalized = NormalizedPath::new(pattern);
        if normalized.has_traversal() || normalized.is_absolute() {
            return Err(Error::config(format!(
                "output_pattern {pattern:?} must be a relative path without '..'"
            )));
        }
        Ok(Self {
            pattern: pattern.to_string(),
        })
    }

    /// The raw pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Render the relative output path for one photo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputPath`] if the substituted values produce a `..`
    /// segment or an absolute path.
    pub fn render(&self, category: &str, album_slug: &str, filename: &str) -> Result<NormalizedPath> {
        let rendered = self
            .pattern
            .replace("{category}", category)
            .replace("{album_slug}", album_slug)
            .replace("{filename}", filename);
        let path = NormalizedPath::new(&rendered);
        if path.has_traversal() || path.is_absolute() {
            return Err(Error::OutputPath {
                message: format!("path traversal detected in rendered path {rendered:?}"),
            });
        }
        Ok(path)
    }
}

/// Output filename: the source stem with the export format's extension.
///
/// Directory components in the provider's filename are discarded.
pub fn output_filename(source_filename: &str, extension: &str) -> String {
    let base = source_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_filename);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    let stem = if stem.is_empty() || stem == "." || stem == ".." {
        "photo"
    } else {
        stem
    };
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn renders_default_pattern() {
        let template = OutputTemplate::parse("{category}/{album_slug}/{filename}").unwrap();
        let path = template.render("eagles", "game-day", "IMG_1.jpg").unwrap();
        assert_eq!(path.as_str(), "eagles/game-day/IMG_1.jpg");
    }

    #[rstest]
    #[case("{category}/{album}/{filename}")]
    #[case("{category}/{album_slug}")]
    #[case("../{filename}")]
    #[case("/abs/{filename}")]
    fn rejects_bad_patterns(#[case] pattern: &str) {
        let err = OutputTemplate::parse(pattern).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn render_rejects_traversal_from_values() {
        let template = OutputTemplate::parse("{category}/{filename}").unwrap();
        assert!(template.render("..", "x", "a.jpg").is_err());
    }

    #[rstest]
    #[case("IMG_0001.HEIC", "jpg", "IMG_0001.jpg")]
    #[case("archive.tar.png", "webp", "archive.tar.webp")]
    #[case("no_extension", "png", "no_extension.png")]
    #[case("nested/dir/IMG_2.jpeg", "jpg", "IMG_2.jpg")]
    #[case(".hidden", "jpg", ".hidden.jpg")]
    #[case("..", "jpg", "photo.jpg")]
    fn output_filename_swaps_extension(
        #[case] source: &str,
        #[case] ext: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(output_filename(source, ext), expected);
    }
}
