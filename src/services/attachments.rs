use crate::error::DecodeError;
use crate::models::Attachment;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

/// Decodes an attachment's data URI to text.
///
/// Failures are logged and reported as `None`; callers drop the attachment
/// and carry on with the rest of the job.
pub fn decode_attachment(attachment: &Attachment) -> Option<String> {
    match decode_data_uri(&attachment.url) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Error decoding attachment {}: {}", attachment.name, e);
            None
        }
    }
}

/// Splits `<header>,<base64>` on the first comma and decodes the payload as UTF-8.
pub fn decode_data_uri(uri: &str) -> Result<String, DecodeError> {
    let (_header, encoded) = uri.split_once(',').ok_or(DecodeError::MissingSeparator)?;
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}
