//! Reconnecting client for the emoji chat WebSocket endpoint.
//!
//! [`manager::ConnectionManager`] holds the connection state machine and
//! has no I/O of its own; [`session::Session`] drives it on tokio with
//! tokio-tungstenite, and [`runner::run_client`] puts a terminal in front.

// layers
pub mod domain;
pub mod manager;
pub mod protocol;
pub mod session;
pub mod view;

pub mod config;
pub mod error;
pub mod runner;

pub use config::ClientConfig;
pub use runner::run_client;
