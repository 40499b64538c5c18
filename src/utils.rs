/*!
 * Utility functions for acadfs
 */

use glob_match::glob_match;
use once_cell::sync::Lazy;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Operating-system and tooling clutter never shown as nodes or materials
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        // OS Files
        ".DS_Store",
        "._*",
        "Thumbs.db",
        "desktop.ini",
        "ehthumbs.db",
        ".directory",
        ".Trash-*",
        // Editors
        "*.swp",
        "*~",
        ".~lock.*#",
    ]
});

/// Whether an entry name matches one of the default ignore patterns
pub fn is_ignored(name: &str) -> bool {
    DEFAULT_IGNORE
        .iter()
        .any(|pattern| *pattern == name || glob_match(pattern, name))
}
