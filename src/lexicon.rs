// src/lexicon.rs
//! Keyword tables used by ingestion and classification filters.
//!
//! Kept as plain constant slices (not inline literals at call sites) so the
//! lists can be tuned and unit-tested independently of control flow. Every
//! consumer takes the table as a parameter and defaults to the constant here.

/// Boilerplate words that disqualify a title at ingestion (matched
/// case-insensitively as substrings of the normalized title).
pub const TITLE_DENYLIST: &[&str] = &[
    "subscribe",
    "login",
    "register",
    "advertisement",
    "menu",
    "search",
    "newsletter",
];

/// Markers that tag an article as India-affiliated when found in its link or
/// source label (lowercased substring match). Country TLD plus named outlets.
pub const INDIA_MARKERS: &[&str] = &[
    "india",
    ".in",
    "timesofindia",
    "hindustantimes",
    "thehindu",
    "jagran",
    "ndtv",
    "livemint",
];

/// File extensions accepted as image URLs (checked against the URL path with
/// any query string stripped).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg",
];

/// Path fragments that mark a URL as image-ish even without a known
/// extension (CDN and media-server conventions).
pub const IMAGE_PATH_HINTS: &[&str] = &[
    "images", "img", "photo", "pics", "media", "upload", "cdn", "static",
    "thumb", "resize", "crop", "avatar", "logo", "banner",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_lowercase() {
        for w in TITLE_DENYLIST
            .iter()
            .chain(INDIA_MARKERS)
            .chain(IMAGE_EXTENSIONS)
            .chain(IMAGE_PATH_HINTS)
        {
            assert_eq!(*w, w.to_lowercase(), "lookup tables must be lowercase");
        }
    }
}
