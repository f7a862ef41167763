//! Folder-provider photo library fixture.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};
use tempfile::TempDir;

/// A temporary photo library laid out the way the `folder` provider reads it:
/// one directory per album, image files inside.
///
/// ```rust,no_run
/// use photo_test_utils::library::PhotoLibrary;
///
/// let lib = PhotoLibrary::new()
///     .with_photo("Eagles 2024", "IMG_0001.png", 64, 48)
///     .with_photo("Eagles 2024", "IMG_0002.png", 32, 32);
/// assert!(lib.photo_path("Eagles 2024", "IMG_0001.png").exists());
/// ```
pub struct PhotoLibrary {
    temp_dir: TempDir,
}

impl Default for PhotoLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("PhotoLibrary: create temp dir"),
        }
    }

    /// Library root (the `provider.root` config value).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a photo file inside an album.
    pub fn photo_path(&self, album: &str, filename: &str) -> PathBuf {
        self.root().join(album).join(filename)
    }

    /// Create an empty album directory.
    pub fn with_album(self, album: &str) -> Self {
        fs::create_dir_all(self.root().join(album)).expect("PhotoLibrary: create album");
        self
    }

    /// Write a decodable image into `album`, encoded by file extension.
    pub fn with_photo(self, album: &str, filename: &str, width: u32, height: u32) -> Self {
        self.write_photo(album, filename, width, height, 0);
        self
    }

    /// Overwrite a photo with different pixels and size, changing its fingerprint.
    pub fn edit_photo(&self, album: &str, filename: &str) {
        let (width, height) = image::image_dimensions(self.photo_path(album, filename))
            .expect("PhotoLibrary: read dimensions");
        self.write_photo(album, filename, width + 1, height, 97);
    }

    /// Write a file with an image extension that cannot be decoded.
    pub fn with_corrupt_photo(self, album: &str, filename: &str) -> Self {
        let path = self.photo_path(album, filename);
        fs::create_dir_all(path.parent().expect("album dir")).expect("PhotoLibrary: album");
        fs::write(&path, b"definitely not an image").expect("PhotoLibrary: write corrupt photo");
        self
    }

    /// Delete a photo from its album.
    pub fn remove_photo(&self, album: &str, filename: &str) {
        fs::remove_file(self.photo_path(album, filename)).expect("PhotoLibrary: remove photo");
    }

    fn write_photo(&self, album: &str, filename: &str, width: u32, height: u32, seed: u8) {
        let path = self.photo_path(album, filename);
        fs::create_dir_all(path.parent().expect("album dir")).expect("PhotoLibrary: album");
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                (x as u8).wrapping_add(seed),
                (y as u8).wrapping_mul(3),
                seed,
            ])
        });
        img.save(&path)
            .unwrap_or_else(|e| panic!("PhotoLibrary: save {}: {e}", path.display()));
    }
}
