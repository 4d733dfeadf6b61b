// src/ingest/image.rs
//! Representative-image heuristics: URL validity checks, HTML scanning, and
//! relative-reference resolution against the feed origin.

use once_cell::sync::OnceCell;
use regex::Regex;
use url::Url;

use crate::lexicon::{IMAGE_EXTENSIONS, IMAGE_PATH_HINTS};

/// A URL counts as an image when it has a known image extension OR an
/// image-ish path fragment, AND parses with a non-empty host.
pub fn is_valid_image_url_with(url: &str, extensions: &[&str], hints: &[&str]) -> bool {
    if url.is_empty() {
        return false;
    }

    let clean = url.split('?').next().unwrap_or("").to_lowercase();
    let has_extension = extensions.iter().any(|ext| clean.ends_with(ext));
    let lower = url.to_lowercase();
    let has_hint = hints.iter().any(|h| lower.contains(h));

    let has_host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| !h.is_empty()))
        .unwrap_or(false);

    (has_extension || has_hint) && has_host
}

/// Validity check with the default lookup tables.
pub fn is_valid_image_url(url: &str) -> bool {
    is_valid_image_url_with(url, IMAGE_EXTENSIONS, IMAGE_PATH_HINTS)
}

fn html_image_patterns() -> &'static [Regex] {
    static PATTERNS: OnceCell<Vec<Regex>> = OnceCell::new();
    PATTERNS
        .get_or_init(|| {
            [
                r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#,
                r#"(?i)<img[^>]+src=([^\s>]+)"#,
                r#"(?i)src=["']([^"']*\.(?:jpg|jpeg|png|gif|webp|bmp)(?:\?[^"']*)?)["']"#,
                r#"(?i)background-image:\s*url\(["']?([^"')\s]+)["']?\)"#,
                r#"(?i)data-src=["']([^"']+)["']"#,
                r#"(?i)data-lazy-src=["']([^"']+)["']"#,
            ]
            .iter()
            .map(|p| Regex::new(p).expect("image pattern"))
            .collect()
        })
        .as_slice()
}

/// Scan an HTML fragment for image URL candidates. Entities are decoded
/// first; candidates come out in pattern order, then document order.
pub fn scan_html_for_images(html: &str) -> Vec<String> {
    let decoded = html_escape::decode_html_entities(html).to_string();
    let mut out = Vec::new();
    for re in html_image_patterns() {
        for caps in re.captures_iter(&decoded) {
            if let Some(m) = caps.get(1) {
                out.push(m.as_str().trim().to_string());
            }
        }
    }
    out
}

/// Turn a raw candidate into a validated absolute image URL: strip stray
/// quotes, resolve relative references against `base`, then re-validate.
pub fn resolve_candidate(raw: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"');
    if trimmed.is_empty() {
        return None;
    }

    let absolute = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        base?.join(trimmed).ok()?.to_string()
    };

    if is_valid_image_url(&absolute) {
        Some(absolute)
    } else {
        None
    }
}

/// First candidate that survives resolution + validation.
pub fn first_valid<'a, I>(candidates: I, base: Option<&Url>) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .find_map(|c| resolve_candidate(c, base))
}
