//! `data:` URL encoding for image payloads.
//!
//! Only the base64 form is produced or accepted:
//! ```text
//! data:<mime>;base64,<payload>
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const BASE64_MARKER: &str = ";base64,";

/// Encode `bytes` as a base64 data URL with the given MIME type.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{}{}{}", mime_type, BASE64_MARKER, STANDARD.encode(bytes))
}

/// Split a data URL into its MIME type and base64 payload.
pub fn split(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(BASE64_MARKER)?;
    Some((mime, payload))
}

/// Check that `url` is an image data URL carrying real content.
///
/// `min_chars` bounds the whole URL; anything shorter is an empty or
/// placeholder encode (e.g. `data:,` from a canvas with no pixels).
pub fn validate_image(url: &str, min_chars: usize) -> Result<(), String> {
    let (mime, payload) = split(url).ok_or_else(|| "not a base64 data URL".to_string())?;
    if !mime.starts_with("image/") {
        return Err(format!("unexpected MIME type {:?}", mime));
    }
    if payload.is_empty() || url.len() < min_chars {
        return Err(format!(
            "payload too short ({} chars, need at least {})",
            url.len(),
            min_chars
        ));
    }
    Ok(())
}
