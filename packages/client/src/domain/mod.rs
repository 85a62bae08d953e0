//! Domain state of the chat client.
//!
//! Everything here is pure state with no I/O, so the connection manager
//! and the tests can drive it directly.

pub mod backoff;
pub mod connection;
pub mod pending;

pub use backoff::Backoff;
pub use connection::{ConnectionState, SocketId};
pub use pending::PendingMessage;
