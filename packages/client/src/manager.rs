//! Connection manager: the state machine behind the chat client.
//!
//! The manager performs no I/O. The session feeds it [`Event`]s through
//! [`ConnectionManager::handle`]; it updates its own state, drives the
//! [`ChatView`], and answers with [`Command`]s (open a socket, send a
//! frame, arm a timer) for the session to carry out.
//!
//! Transition table:
//!
//! | from | event | to |
//! |---|---|---|
//! | startup | - | `Connecting`, socket opened at once |
//! | `Connecting` | `init` on current socket | `Connected` |
//! | any | unclean close, attempts ≤ 20 | `Connecting`, reconnect after the pre-update delay |
//! | any | unclean close, attempts > 20 | `Disconnected` |
//! | any | clean close | `Disconnected` |
//! | `Disconnected` | status indicator activated | `Connecting`, socket opened at once |

use std::time::Duration;

use crate::{
    config::Labels,
    domain::{Backoff, ConnectionState, PendingMessage, SocketId},
    protocol::{
        ClientMessage, HEARTBEAT_FRAME, ServerMessage, decode_server_message,
        encode_client_message,
    },
    view::{Acknowledgement, ChatView},
};

/// Input to the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The transport finished its opening handshake.
    Opened { socket: SocketId },
    /// A text frame arrived.
    Frame { socket: SocketId, text: String },
    /// The socket closed, or could not be opened at all (`was_clean = false`).
    Closed { socket: SocketId, was_clean: bool },
    /// The heartbeat interval elapsed.
    HeartbeatDue,
    /// The reconnect delay elapsed.
    ReconnectDue,
    /// The user activated the status indicator.
    StatusActivated,
    /// The user submitted the input box.
    Submit,
}

/// Side effect requested by the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a new socket, superseding any previous one.
    Connect { socket: SocketId },
    /// Send a text frame on the given socket.
    Send { socket: SocketId, frame: String },
    /// Emit [`Event::ReconnectDue`] after `delay`.
    ScheduleReconnect { delay: Duration },
    /// Start emitting [`Event::HeartbeatDue`] at the heartbeat interval.
    StartHeartbeat,
    StopHeartbeat,
}

/// Owner of all per-connection client state.
pub struct ConnectionManager<V> {
    view: V,
    labels: Labels,
    state: ConnectionState,
    backoff: Backoff,
    pending: PendingMessage,
    /// Socket whose events are acted upon; `None` while waiting to reconnect.
    current_socket: Option<SocketId>,
    last_socket: SocketId,
    heartbeat_active: bool,
    retry_bound: bool,
    submit_enabled: bool,
    /// Blocking notice still on screen.
    acknowledgement: Option<Acknowledgement>,
}

impl<V: ChatView> ConnectionManager<V> {
    pub fn new(view: V, labels: Labels) -> Self {
        Self {
            view,
            labels,
            state: ConnectionState::Connecting,
            backoff: Backoff::new(),
            pending: PendingMessage::new(),
            current_socket: None,
            last_socket: SocketId::default(),
            heartbeat_active: false,
            retry_bound: false,
            submit_enabled: false,
            acknowledgement: None,
        }
    }

    /// Enter `Connecting` and open the first socket.
    pub fn start(&mut self) -> Vec<Command> {
        tracing::info!("Starting emoji chat connection");
        self.view.set_submit_enabled(false);
        self.enter(ConnectionState::Connecting);
        vec![self.connect()]
    }

    /// Process one event and return the commands it produces.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Opened { socket } => {
                if self.is_current(socket) {
                    tracing::debug!("Socket {} opened, waiting for init", socket);
                } else {
                    tracing::debug!("Ignoring open of stale socket {}", socket);
                }
                Vec::new()
            }
            Event::Frame { socket, text } => {
                if !self.is_current(socket) {
                    tracing::debug!("Ignoring frame from stale socket {}", socket);
                    return Vec::new();
                }
                self.on_frame(&text)
            }
            Event::Closed { socket, was_clean } => {
                if !self.is_current(socket) {
                    tracing::debug!("Ignoring close of stale socket {}", socket);
                    return Vec::new();
                }
                self.on_closed(socket, was_clean)
            }
            Event::HeartbeatDue => self.on_heartbeat(),
            Event::ReconnectDue => self.on_reconnect_due(),
            Event::StatusActivated => self.on_status_activated(),
            Event::Submit => self.on_submit(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn pending(&self) -> &PendingMessage {
        &self.pending
    }

    pub fn current_socket(&self) -> Option<SocketId> {
        self.current_socket
    }

    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat_active
    }

    pub fn retry_bound(&self) -> bool {
        self.retry_bound
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Take the acknowledgement of a blocking notice shown by the last
    /// event. The caller must not hand in further events before it resolves.
    pub fn take_acknowledgement(&mut self) -> Option<Acknowledgement> {
        self.acknowledgement.take()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    fn is_current(&self, socket: SocketId) -> bool {
        self.current_socket == Some(socket)
    }

    fn enter(&mut self, state: ConnectionState) {
        if self.state != state {
            tracing::info!("Connection state: {} -> {}", self.state, state);
        }
        self.state = state;
        self.view.set_status(state, self.labels.status(state));
    }

    fn connect(&mut self) -> Command {
        let socket = self.last_socket.next();
        self.last_socket = socket;
        self.current_socket = Some(socket);
        tracing::debug!("Opening socket {}", socket);
        Command::Connect { socket }
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        if self.submit_enabled != enabled {
            self.submit_enabled = enabled;
            self.view.set_submit_enabled(enabled);
        }
    }

    fn on_frame(&mut self, text: &str) -> Vec<Command> {
        let message = match decode_server_message(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Protocol violation: {}", e);
                return Vec::new();
            }
        };

        match message {
            ServerMessage::Messages { messages } => {
                self.view.clear_messages();
                for message in &messages {
                    self.view.render_message(message);
                }
                Vec::new()
            }
            ServerMessage::Message { message } => {
                self.view.render_message(&message);
                Vec::new()
            }
            ServerMessage::Init { current_user } => {
                self.view.render_current_user(&current_user);
                self.on_connected()
            }
            ServerMessage::Users { users } => {
                tracing::debug!("Users: {}", users);
                Vec::new()
            }
            ServerMessage::Ratelimit { retry_after } => {
                tracing::info!("Rate limited, retry after {}s", retry_after);
                self.restore_pending();
                let notice = self.labels.ratelimit_notice(retry_after);
                self.notify_blocking(&notice);
                Vec::new()
            }
            ServerMessage::Error { error } => {
                tracing::info!("Server rejected message: {}", error);
                self.restore_pending();
                self.notify_blocking(&error);
                Vec::new()
            }
            ServerMessage::Unknown { kind } => {
                tracing::warn!("Protocol violation: unknown message type '{}'", kind);
                Vec::new()
            }
        }
    }

    fn on_connected(&mut self) -> Vec<Command> {
        self.backoff.reset_on_success();
        self.enter(ConnectionState::Connected);
        self.set_submit_enabled(true);

        if self.heartbeat_active {
            Vec::new()
        } else {
            self.heartbeat_active = true;
            vec![Command::StartHeartbeat]
        }
    }

    fn on_closed(&mut self, socket: SocketId, was_clean: bool) -> Vec<Command> {
        self.current_socket = None;
        self.set_submit_enabled(false);

        let mut commands = Vec::new();
        if self.heartbeat_active {
            self.heartbeat_active = false;
            commands.push(Command::StopHeartbeat);
        }

        if was_clean {
            tracing::info!("Socket {} closed cleanly", socket);
            self.enter_disconnected();
            return commands;
        }

        match self.backoff.record_failure() {
            Some(delay) => {
                tracing::warn!(
                    "Socket {} closed unexpectedly, reconnecting in {}ms (attempt {})",
                    socket,
                    delay.as_millis(),
                    self.backoff.attempts()
                );
                self.enter(ConnectionState::Connecting);
                commands.push(Command::ScheduleReconnect { delay });
            }
            None => {
                tracing::warn!(
                    "Socket {} closed unexpectedly, giving up after {} attempts",
                    socket,
                    self.backoff.attempts() - 1
                );
                self.enter_disconnected();
            }
        }
        commands
    }

    fn enter_disconnected(&mut self) {
        self.enter(ConnectionState::Disconnected);
        if !self.retry_bound {
            self.retry_bound = true;
            self.view.bind_retry();
        }
    }

    fn on_heartbeat(&mut self) -> Vec<Command> {
        match (self.state, self.heartbeat_active, self.current_socket) {
            (ConnectionState::Connected, true, Some(socket)) => {
                tracing::trace!("Sending heartbeat on socket {}", socket);
                vec![Command::Send {
                    socket,
                    frame: HEARTBEAT_FRAME.to_string(),
                }]
            }
            _ => {
                tracing::debug!("Ignoring heartbeat while {}", self.state);
                Vec::new()
            }
        }
    }

    fn on_reconnect_due(&mut self) -> Vec<Command> {
        if self.state == ConnectionState::Connecting && self.current_socket.is_none() {
            vec![self.connect()]
        } else {
            tracing::debug!("Ignoring reconnect timer while {}", self.state);
            Vec::new()
        }
    }

    fn on_status_activated(&mut self) -> Vec<Command> {
        if !self.retry_bound {
            tracing::debug!("Status indicator is not clickable while {}", self.state);
            return Vec::new();
        }

        tracing::info!("Manual reconnect requested");
        self.backoff.reset_for_manual_retry();
        self.retry_bound = false;
        self.view.unbind_retry();
        self.enter(ConnectionState::Connecting);
        vec![self.connect()]
    }

    fn on_submit(&mut self) -> Vec<Command> {
        let socket = match (self.submit_enabled, self.current_socket) {
            (true, Some(socket)) => socket,
            _ => {
                tracing::debug!("Submit ignored while {}", self.state);
                // offer the text again, it may have been typed before the drop
                let text = self.view.input();
                if !text.is_empty() {
                    self.view.set_input(&text);
                }
                return Vec::new();
            }
        };

        let text = self.view.input();
        if text.is_empty() {
            return Vec::new();
        }

        let frame = match encode_client_message(&ClientMessage::Message {
            message: text.clone(),
        }) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
                return Vec::new();
            }
        };

        self.pending.stash(text);
        self.view.set_input("");
        vec![Command::Send { socket, frame }]
    }

    fn notify_blocking(&mut self, text: &str) {
        let acknowledgement = self.view.notify_blocking(text);
        if acknowledgement.is_pending() {
            self.acknowledgement = Some(acknowledgement);
        }
    }

    fn restore_pending(&mut self) {
        let current = self.view.input();
        if let Some(text) = self.pending.restore_if_present(&current) {
            self.view.set_input(&text);
        }
    }
}
