//! Video titles and the file names derived from them

/// Characters removed from titles before they become file names.
const FORBIDDEN: &[char] = &[
    '\'', '"', '!', '@', '#', '$', '%', '^', '&', '*', '+', '/', '?', '\\', '`', '~',
];

/// Sanitize a video title for use as a file stem.
///
/// Strips [`FORBIDDEN`] characters, collapses `" - "` to `-`, then turns the
/// remaining spaces into underscores.
pub fn sanitize(title: &str) -> String {
    let stripped: String = title.chars().filter(|c| !FORBIDDEN.contains(c)).collect();
    stripped.replace(" - ", "-").replace(' ', "_")
}

/// A resolved video and the name its files will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTarget {
    pub source_url: String,
    pub title: String,
    pub sanitized_title: String,
}

impl VideoTarget {
    pub fn new(source_url: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let sanitized_title = sanitize(&title);
        Self {
            source_url: source_url.into(),
            title,
            sanitized_title,
        }
    }

    /// File name for this video with the given extension (no leading dot).
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.sanitized_title, extension)
    }
}
