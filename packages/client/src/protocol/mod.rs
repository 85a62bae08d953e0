//! Wire protocol of the emoji chat endpoint.
//!
//! Every frame is one UTF-8 JSON object with a `type` discriminator,
//! except the heartbeat which is an empty text frame.

mod codec;
mod message;

pub use codec::{HEARTBEAT_FRAME, decode_server_message, encode_client_message};
pub use message::{ClientMessage, MessageRecord, ServerMessage};
