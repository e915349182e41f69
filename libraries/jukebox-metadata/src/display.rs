//! Now-playing display text

/// Separator between title, artist and album
const SEPARATOR: &str = " - ";

/// Drop control and non-ASCII characters
///
/// Only printable ASCII (32..=126) survives; status displays on small
/// devices cannot render anything else.
pub fn strip_control_and_extended(text: &str) -> String {
    text.chars().filter(|c| (' '..='~').contains(c)).collect()
}

/// Build "title - artist - album", skipping empty parts
///
/// Returns an empty string when every part is empty after stripping.
pub fn display_text(title: Option<&str>, artist: Option<&str>, album: Option<&str>) -> String {
    [title, artist, album]
        .into_iter()
        .flatten()
        .map(strip_control_and_extended)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
