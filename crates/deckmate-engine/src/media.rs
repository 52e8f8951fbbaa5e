//! Media asset conventions and reference extraction.
//!
//! A media asset belongs to exactly one card, by filename:
//! `<uid>_<seq>.<ext>` (e.g. `01-001_01.png`). Cards reference assets from
//! their HTML with `<img src="...">` or `[sound:...]`; there is no explicit
//! field linking the two.

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Extract media filenames referenced by card HTML.
///
/// Matches `[sound:filename]` and local `<img src="filename">` references;
/// external URLs are skipped.
pub fn media_references(html: &str) -> Vec<String> {
    let mut files = Vec::new();

    let sound_pattern = regex_lite::Regex::new(r"\[sound:([^\]]+)\]").unwrap();
    for cap in sound_pattern.captures_iter(html) {
        if let Some(m) = cap.get(1) {
            files.push(m.as_str().to_string());
        }
    }

    let img_pattern = regex_lite::Regex::new(r#"<img[^>]+src="([^"]+)"[^>]*>"#).unwrap();
    for cap in img_pattern.captures_iter(html) {
        if let Some(m) = cap.get(1) {
            let src = m.as_str();
            if !src.starts_with("http://") && !src.starts_with("https://") {
                files.push(src.to_string());
            }
        }
    }

    files
}

/// The uid that owns an asset filename, per the `<uid>_<seq>.<ext>`
/// convention. Returns `None` for filenames outside the convention.
pub fn asset_owner<'a>(filename: &'a str, uid_prefix: &str) -> Option<&'a str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    let (uid, seq) = stem.rsplit_once('_')?;
    if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    crate::content::parse_uid(uid, uid_prefix)?;
    Some(uid)
}

/// Read a local asset and base64-encode it for `storeMediaFile`.
pub fn encode_asset(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(BASE64.encode(bytes))
}
