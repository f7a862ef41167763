//! Slug derivation for pattern-mapped albums

use sha2::{Digest, Sha256};

const SEPARATOR: char = '-';

/// Derive a filesystem-safe slug from an album name.
///
/// Lower-cases the name and replaces every run of non-alphanumeric
/// characters with a single `-`, trimming separators at both ends. A name
/// with no alphanumeric characters at all gets `album-<hash>` so the result
/// is never empty and stays deterministic.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        let digest = Sha256::digest(name.as_bytes());
        let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
        return format!("album-{short}");
    }
    slug
}
