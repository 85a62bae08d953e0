//! Client configuration: endpoint, locale strings and timer settings.

use std::time::Duration;

use url::Url;

use crate::{domain::ConnectionState, error::ConfigError};

/// Path of the chat endpoint relative to the page origin.
pub const WEBSOCKET_PATH: &str = "/websocket/emoji-chat";

/// Interval of the keep-alive frame while connected.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound on the TCP, TLS and WebSocket handshake of one socket.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Derive the WebSocket endpoint from a page origin.
///
/// The scheme mirrors the page's: `http` becomes `ws`, `https` becomes
/// `wss`. Any path, query or fragment of the origin is discarded.
pub fn websocket_url(origin: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(origin).map_err(|source| ConfigError::InvalidOrigin {
        origin: origin.to_string(),
        source,
    })?;

    let scheme = match parsed.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    };
    let host = parsed
        .host_str()
        .ok_or_else(|| ConfigError::MissingHost(origin.to_string()))?;
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let endpoint = format!("{}://{}{}", scheme, authority, WEBSOCKET_PATH);
    Url::parse(&endpoint).map_err(|source| ConfigError::InvalidOrigin {
        origin: origin.to_string(),
        source,
    })
}

/// Languages with a built-in string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Lang {
    #[default]
    En,
    De,
    Ja,
}

/// User-facing strings of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub connecting: String,
    pub connected: String,
    pub disconnected: String,
    /// Notice shown on rate limiting; `{}` is replaced by the wait in seconds.
    pub ratelimit_template: String,
}

impl Labels {
    pub fn for_lang(lang: Lang) -> Self {
        let (connecting, connected, disconnected, ratelimit) = match lang {
            Lang::En => (
                "Connecting…",
                "Connected",
                "Disconnected, use /retry to reconnect",
                "Too many messages, retry after {} seconds",
            ),
            Lang::De => (
                "Verbinde…",
                "Verbunden",
                "Getrennt, /retry zum erneuten Verbinden",
                "Zu viele Nachrichten, erneut versuchen in {} Sekunden",
            ),
            Lang::Ja => (
                "接続中…",
                "接続済み",
                "切断されました。/retry で再接続します",
                "送信が多すぎます。{} 秒後に再試行してください",
            ),
        };
        Self {
            connecting: connecting.to_string(),
            connected: connected.to_string(),
            disconnected: disconnected.to_string(),
            ratelimit_template: ratelimit.to_string(),
        }
    }

    /// Tooltip text for the status indicator.
    pub fn status(&self, state: ConnectionState) -> &str {
        match state {
            ConnectionState::Connecting => &self.connecting,
            ConnectionState::Connected => &self.connected,
            ConnectionState::Disconnected => &self.disconnected,
        }
    }

    pub fn ratelimit_notice(&self, retry_after_secs: f64) -> String {
        self.ratelimit_template
            .replacen("{}", &retry_after_secs.to_string(), 1)
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::for_lang(Lang::default())
    }
}

/// Runtime timer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub heartbeat_interval: Duration,
    /// A socket still handshaking after this long counts as closed uncleanly.
    pub connect_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            heartbeat_interval: HEARTBEAT_INTERVAL,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// Everything the client needs to run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: Url,
    pub labels: Labels,
    pub timings: Timings,
}

impl ClientConfig {
    pub fn new(origin: &str, lang: Lang) -> Result<Self, ConfigError> {
        Ok(Self {
            url: websocket_url(origin)?,
            labels: Labels::for_lang(lang),
            timings: Timings::default(),
        })
    }
}
