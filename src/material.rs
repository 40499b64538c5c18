/*!
 * File-name driven facts about a material: category, extension and preview
 */

use std::path::Path;

use once_cell::sync::Lazy;
use strum::IntoEnumIterator;

use crate::types::{Category, PreviewKind};

/// Categories that carry a token, in matching priority order
static CATEGORY_TOKENS: Lazy<Vec<(&'static str, Category)>> = Lazy::new(|| {
    Category::iter()
        .filter_map(|category| category.token().map(|token| (token, category)))
        .collect()
});

/// Classify a material by the first category token found in its name.
///
/// Matching is case-insensitive. When a name contains several tokens the
/// earliest in priority order wins: midsem_paper, endsem_paper,
/// question_bank, solutions, short_notes.
pub fn classify(file_name: &str) -> Category {
    let lowered = file_name.to_lowercase();
    CATEGORY_TOKENS
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

/// Lower-cased extension with its leading dot, or an empty string
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Preview capability for an extension as returned by [`extension_of`]
pub fn preview_kind(extension: &str) -> PreviewKind {
    match extension {
        ".pdf" => PreviewKind::Pdf,
        ".jpg" | ".jpeg" | ".png" => PreviewKind::Image,
        _ => PreviewKind::None,
    }
}

/// Media type label used when handing bytes to a client
pub fn media_type(extension: &str) -> &'static str {
    match extension {
        ".pdf" => "application/pdf",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        _ => "application/octet-stream",
    }
}
