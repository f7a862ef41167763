use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageReader};

use super::{ExportError, ExportedFile, Exporter};
use crate::config::{ExportParams, ImageFormat};
use crate::provider::Photo;

/// Decodes the source with `image`, downsizes it to `max_width` and
/// re-encodes it.
///
/// Re-encoding writes pixel data only, so EXIF (GPS included) never reaches
/// the output regardless of `strip_gps`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageExporter;

impl ImageExporter {
    pub fn new() -> Self {
        Self
    }

    fn decode(photo: &Photo) -> Result<DynamicImage, ExportError> {
        let path = &photo.source_path;
        ImageReader::open(path)
            .map_err(|source| ExportError::Read {
                path: path.clone(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| ExportError::Read {
                path: path.clone(),
                source,
            })?
            .decode()
            .map_err(|e| ExportError::Decode {
                path: path.clone(),
                message: e.to_string(),
            })
    }

    fn encode(
        img: &DynamicImage,
        writer: &mut BufWriter<File>,
        params: &ExportParams,
    ) -> image::ImageResult<()> {
        match params.format {
            ImageFormat::Jpg => {
                let rgb = img.to_rgb8();
                JpegEncoder::new_with_quality(writer, params.quality).write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
            }
            ImageFormat::Png => {
                let rgba = img.to_rgba8();
                PngEncoder::new(writer).write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    image::ExtendedColorType::Rgba8,
                )
            }
            ImageFormat::Webp => {
                let rgba = img.to_rgba8();
                WebPEncoder::new_lossless(writer).write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    image::ExtendedColorType::Rgba8,
                )
            }
        }
    }
}

impl Exporter for ImageExporter {
    fn export(
        &self,
        photo: &Photo,
        output: &Path,
        params: &ExportParams,
    ) -> Result<ExportedFile, ExportError> {
        let write_err = |message: String| ExportError::Write {
            path: output.to_path_buf(),
            message,
        };

        let mut img = Self::decode(photo)?;
        if img.width() > params.max_width {
            let height = ((u64::from(img.height()) * u64::from(params.max_width))
                / u64::from(img.width()))
            .max(1) as u32;
            img = img.resize_exact(params.max_width, height, FilterType::Lanczos3);
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let temp = photo_fs::temp_path_for(output);
        let written = File::create(&temp)
            .map_err(|e| write_err(e.to_string()))
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                Self::encode(&img, &mut writer, params).map_err(|e| ExportError::Encode {
                    path: output.to_path_buf(),
                    message: e.to_string(),
                })?;
                writer.flush().map_err(|e| write_err(e.to_string()))
            });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }

        if let Err(e) = photo_fs::persist(&temp, output) {
            let _ = std::fs::remove_file(&temp);
            return Err(write_err(e.to_string()));
        }

        let checksum =
            photo_fs::compute_file_checksum(output).map_err(|e| write_err(e.to_string()))?;

        tracing::debug!(
            photo_id = %photo.id,
            output = %output.display(),
            width = img.width(),
            height = img.height(),
            "Exported photo"
        );

        Ok(ExportedFile {
            path: output.to_path_buf(),
            checksum,
            width: img.width(),
            height: img.height(),
        })
    }
}
