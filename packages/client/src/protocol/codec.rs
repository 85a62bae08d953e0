//! Decoding of inbound frames and encoding of outbound ones.

use serde_json::Value;

use crate::error::ProtocolError;

use super::message::{ClientMessage, ServerMessage};

/// Payload of the keep-alive frame. Not JSON.
pub const HEARTBEAT_FRAME: &str = "";

/// Decode an inbound text frame.
///
/// Frames with an unrecognized `type` decode to [`ServerMessage::Unknown`];
/// only frames that are not JSON objects with a string `type`, or known
/// types with a malformed payload, are errors.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_string();

    if !ServerMessage::KNOWN_TYPES.iter().any(|known| *known == kind) {
        return Ok(ServerMessage::Unknown { kind });
    }

    serde_json::from_value(value).map_err(|source| ProtocolError::InvalidPayload { kind, source })
}

/// Encode an outbound message as a JSON text frame.
pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
