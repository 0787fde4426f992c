//! Image path sanitization.
//!
//! Authors reference images the way their notes app writes them: bare
//! relative paths, wiki-links, Windows separators, or full URLs. All of
//! them are normalized to something safe to drop into an attribute.

/// Normalizes a raw image reference into a URL-safe path.
///
/// Absolute URLs (`http://`, `https://`, protocol-relative `//`) pass
/// through untouched. Anything else is split on `/` and `\`, each non-empty
/// segment is percent-encoded, and the result is rooted under `asset_root`.
///
/// Returns an empty string when nothing usable remains.
#[must_use]
pub fn sanitize_image_path(raw: &str, asset_root: &str) -> String {
    let cleaned = raw.replace("[[", "").replace("]]", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    if is_absolute_url(cleaned) {
        return cleaned.to_string();
    }

    let segments: Vec<String> = cleaned
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(encode_component)
        .collect();
    if segments.is_empty() {
        return String::new();
    }

    format!("{}/{}", asset_root.trim_end_matches('/'), segments.join("/"))
}

/// Whether `path` is already an absolute or protocol-relative URL.
#[must_use]
pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Percent-encodes a single path segment.
///
/// Keeps ASCII alphanumerics and `- _ . ! ~ * ' ( )`; every other byte of
/// the UTF-8 encoding becomes `%XX`.
#[must_use]
pub fn encode_component(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
        {
            encoded.push(char::from(byte));
        } else {
            encoded.push('%');
            encoded.push(char::from(HEX[usize::from(byte >> 4)]));
            encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
    }
    encoded
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";
