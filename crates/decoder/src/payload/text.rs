//! `TEXT_MESSAGE_APP` decoder.

use crate::error::DecodeResult;
use crate::packet::{DecodedPayload, Message};

/// Decode a UTF-8 text message. Whitespace is trimmed and an empty message
/// yields `None`.
pub fn decode(bytes: &[u8]) -> DecodeResult<Option<DecodedPayload>> {
    let text = std::str::from_utf8(bytes)?.trim();
    if text.is_empty() {
        return Ok(None);
    }

    Ok(Some(DecodedPayload::Message(Message {
        content: text.to_string(),
    })))
}
