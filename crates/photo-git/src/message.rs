//! Commit message templating

/// Number of album names spelled out before the "(+N more)" suffix.
const MAX_LISTED_ALBUMS: usize = 3;

/// Render a commit message template.
///
/// Supports `{count}` (number of exported photos) and `{albums}` (the first
/// three album names joined by ", " followed by "(+N more)" when there are
/// more). Unknown placeholders are left as written.
pub fn render_commit_message(template: &str, count: usize, albums: &[String]) -> String {
    let mut listed = albums
        .iter()
        .take(MAX_LISTED_ALBUMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if albums.len() > MAX_LISTED_ALBUMS {
        listed.push_str(&format!(" (+{} more)", albums.len() - MAX_LISTED_ALBUMS));
    }

    template
        .replace("{count}", &count.to_string())
        .replace("{albums}", &listed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_count_and_albums() {
        let msg = render_commit_message(
            "gallery: sync {count} photos from {albums}",
            4,
            &names(&["Eagles 2024", "Sail Day"]),
        );
        assert_eq!(msg, "gallery: sync 4 photos from Eagles 2024, Sail Day");
    }

    #[test]
    fn truncates_long_album_lists() {
        let msg = render_commit_message("{albums}", 9, &names(&["a", "b", "c", "d", "e"]));
        assert_eq!(msg, "a, b, c (+2 more)");
    }

    #[test]
    fn leaves_unknown_placeholders() {
        let msg = render_commit_message("{count} {branch}", 1, &[]);
        assert_eq!(msg, "1 {branch}");
    }
}
