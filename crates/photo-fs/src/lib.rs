//! Filesystem primitives for photo-sync
//!
//! Provides normalized path handling, durable atomic writes, canonical
//! checksums, and resolution of rendered output paths inside a base directory.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use error::{Error, Result};
pub use io::{persist, read_text, temp_path_for, write_atomic};
pub use path::{NormalizedPath, resolve_within};
