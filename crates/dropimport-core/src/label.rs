//! Filename-derived labels and upload names

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\s-]+").unwrap());
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());

/// Strip the final extension from a filename. Dotfiles keep their name.
#[must_use]
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// Human-readable label for a filename.
///
/// `orc_boss.png` becomes `orc boss`; with `title_case`, `Orc Boss`.
#[must_use]
pub fn derive_label(filename: &str, title_case: bool) -> String {
    let words = SEPARATORS
        .split(strip_extension(filename))
        .filter(|word| !word.is_empty());
    if title_case {
        words.map(capitalize).collect::<Vec<_>>().join(" ")
    } else {
        words.collect::<Vec<_>>().join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collision-resistant name for an upload.
///
/// The base is reduced to `[A-Za-z0-9_]` and suffixed with a millisecond
/// timestamp and the item's position in the batch; the extension is kept.
#[must_use]
pub fn unique_upload_name(filename: &str, timestamp_millis: i64, sequence_index: usize) -> String {
    let base = strip_extension(filename);
    let ext = filename.get(base.len() + 1..).filter(|ext| !ext.is_empty());
    let base = UNSAFE_CHARS.replace_all(base, "_");
    match ext {
        Some(ext) => format!("{base}_{timestamp_millis}_{sequence_index}.{ext}"),
        None => format!("{base}_{timestamp_millis}_{sequence_index}"),
    }
}
