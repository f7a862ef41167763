//! Export parameters and their fingerprint

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Output encoding for exported photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl ImageFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Whether `quality` influences the encoded bytes.
    pub fn uses_quality(self) -> bool {
        matches!(self, Self::Jpg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(Error::config(format!(
                "Unsupported export format: {other:?} (expected jpg, png or webp)"
            ))),
        }
    }
}

/// The parameter set an export is a pure function of, together with the
/// source photo.
///
/// `strip_gps` is part of the hash so an exporter that honors it re-exports
/// when it flips. The built-in [`ImageExporter`](crate::exporter::ImageExporter)
/// never writes EXIF, so for it toggling the flag re-exports identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportParams {
    pub format: ImageFormat,
    pub max_width: u32,
    pub quality: u8,
    pub strip_gps: bool,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpg,
            max_width: 2048,
            quality: 85,
            strip_gps: true,
        }
    }
}

impl ExportParams {
    /// Validate raw values from `[export]`.
    pub fn new(format: &str, max_width: u32, quality: u8, strip_gps: bool) -> Result<Self> {
        let format = format.parse()?;
        if !(1..=100).contains(&quality) {
            return Err(Error::config(format!(
                "Export quality must be 1-100, got {quality}"
            )));
        }
        if max_width < 1 {
            return Err(Error::config(format!(
                "max_width must be positive, got {max_width}"
            )));
        }
        Ok(Self {
            format,
            max_width,
            quality,
            strip_gps,
        })
    }

    /// Stable hash of the parameter set, stored with every sync record.
    ///
    /// Any change here marks every previously exported photo as changed.
    /// Quality only counts for formats that use it.
    pub fn hash(&self) -> String {
        let quality = if self.format.uses_quality() {
            self.quality.to_string()
        } else {
            "-".to_string()
        };
        photo_fs::compute_content_checksum(&format!(
            "v1;format={};max_width={};quality={quality};strip_gps={}",
            self.format, self.max_width, self.strip_gps
        ))
    }
}
