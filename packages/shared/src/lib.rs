//! Helpers shared by the emoji chat binaries: logging setup and
//! server timestamp conversion.

pub mod logger;
pub mod time;
