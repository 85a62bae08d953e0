//! Connection state and socket identity.

use std::fmt;

/// Health of the single chat connection as shown by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// A socket is being opened, or the client is waiting to reconnect.
    Connecting,
    /// The server has greeted the client with `init`.
    Connected,
    /// No automatic reconnect is pending; the user has to retry manually.
    Disconnected,
}

impl ConnectionState {
    /// Value used for the status indicator's state attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation number of a socket created by the connection manager.
///
/// Transport events carry the id of the socket they came from so that
/// late events of a superseded socket can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SocketId(u64);

impl SocketId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id assigned to the socket created after this one.
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_as_str() {
        // テスト項目: 各状態がステータス表示用の文字列に変換される
        // given (前提条件):
        let states = [
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Disconnected,
        ];

        // when (操作):
        let names: Vec<&str> = states.iter().map(|s| s.as_str()).collect();

        // then (期待する結果):
        assert_eq!(names, vec!["connecting", "connected", "disconnected"]);
    }

    #[test]
    fn test_socket_id_next_increments() {
        // テスト項目: 次のソケット ID は 1 大きい
        // given (前提条件):
        let id = SocketId::new(41);

        // when (操作):
        let next = id.next();

        // then (期待する結果):
        assert_eq!(next.value(), 42);
        assert!(next > id);
        assert_eq!(next.to_string(), "#42");
    }
}
