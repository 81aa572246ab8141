//! Data-URL payload codec.
//!
//! Uploaded contents are stored inline in the document as a base64 data URL
//! (`data:<mime>;base64,<content>`), the same text a browser `FileReader`
//! produces. Downloads decode the URL back into bytes.

use crate::domain::error::{DriveError, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Bytes and MIME type recovered from a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encodes raw bytes into a base64 data URL.
#[must_use]
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", BASE64_STANDARD.encode(bytes))
}

/// Decodes a base64 data URL.
///
/// # Errors
///
/// Returns [`DriveError::Encoding`] if the text is not a base64 data URL or the
/// content is not valid base64.
///
/// # Examples
///
/// ```
/// use drivedeck::domain::payload::decode_data_url;
///
/// let decoded = decode_data_url("data:text/plain;base64,aGk=")?;
/// assert_eq!(decoded.bytes, b"hi");
/// assert_eq!(decoded.mime_type, "text/plain");
/// # Ok::<(), drivedeck::DriveError>(())
/// ```
pub fn decode_data_url(url: &str) -> Result<DecodedPayload> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DriveError::Encoding("payload is not a data URL".to_string()))?;

    let (header, content) = rest
        .split_once(',')
        .ok_or_else(|| DriveError::Encoding("data URL has no content separator".to_string()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| DriveError::Encoding("data URL is not base64 encoded".to_string()))?;

    let bytes = BASE64_STANDARD
        .decode(content)
        .map_err(|e| DriveError::Encoding(format!("invalid base64 content: {e}")))?;

    Ok(DecodedPayload {
        mime_type: mime_type.to_string(),
        bytes,
    })
}
