//! Async driver of the connection manager.
//!
//! One supervisor loop owns the [`ConnectionManager`] and executes its
//! commands. Socket tasks, timers and user input report back as events,
//! so the manager only ever sees one event at a time, in arrival order.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

use crate::{
    config::{ClientConfig, Timings},
    domain::SocketId,
    manager::{Command, ConnectionManager, Event},
    view::ChatView,
};

/// How long shutdown waits for the close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Actions coming from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    /// Submit the input box.
    Submit,
    /// Activate the status indicator.
    Retry,
    /// End the session.
    Quit,
}

struct SocketHandle {
    id: SocketId,
    outbound: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

/// A running chat session.
pub struct Session<V> {
    manager: ConnectionManager<V>,
    url: Url,
    timings: Timings,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    socket: Option<SocketHandle>,
    heartbeat: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

impl<V: ChatView> Session<V> {
    pub fn new(config: ClientConfig, view: V) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            manager: ConnectionManager::new(view, config.labels),
            url: config.url,
            timings: config.timings,
            events_tx,
            events_rx,
            socket: None,
            heartbeat: None,
            reconnect: None,
        }
    }

    /// Run until the user quits or the input channel closes.
    ///
    /// Returns the view so callers can inspect what was displayed.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<UserInput>) -> V {
        tracing::info!("Connecting to {}", self.url);
        let commands = self.manager.start();
        self.execute(commands);

        loop {
            let event = tokio::select! {
                Some(event) = self.events_rx.recv() => event,
                input = inputs.recv() => match input {
                    Some(UserInput::Submit) => Event::Submit,
                    Some(UserInput::Retry) => Event::StatusActivated,
                    Some(UserInput::Quit) | None => break,
                },
            };
            let commands = self.manager.handle(event);
            self.execute(commands);

            // like a modal alert, nothing else is handled until it is dismissed
            if let Some(acknowledgement) = self.manager.take_acknowledgement() {
                tracing::debug!("Waiting for the notice to be acknowledged");
                acknowledgement.wait().await;
            }
        }

        self.shutdown().await;
        self.manager.into_view()
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Connect { socket } => self.open_socket(socket),
                Command::Send { socket, frame } => self.send(socket, frame),
                Command::ScheduleReconnect { delay } => self.schedule_reconnect(delay),
                Command::StartHeartbeat => self.start_heartbeat(),
                Command::StopHeartbeat => self.stop_heartbeat(),
            }
        }
    }

    fn open_socket(&mut self, id: SocketId) {
        if let Some(previous) = self.socket.take() {
            tracing::debug!("Dropping superseded socket {}", previous.id);
            previous.task.abort();
        }

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_socket(
            self.url.to_string(),
            id,
            self.timings.connect_timeout,
            outbound_rx,
            self.events_tx.clone(),
        ));
        self.socket = Some(SocketHandle { id, outbound, task });
    }

    fn send(&mut self, socket: SocketId, frame: String) {
        match &self.socket {
            Some(handle) if handle.id == socket => {
                if handle.outbound.send(Message::Text(frame.into())).is_err() {
                    tracing::debug!("Socket {} is gone, frame dropped", socket);
                }
            }
            _ => tracing::debug!("No open socket {}, frame dropped", socket),
        }
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        if let Some(previous) = self.reconnect.take() {
            previous.abort();
        }
        let events = self.events_tx.clone();
        self.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::ReconnectDue);
        }));
    }

    fn start_heartbeat(&mut self) {
        self.stop_heartbeat();
        let period = self.timings.heartbeat_interval;
        let events = self.events_tx.clone();
        self.heartbeat = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if events.send(Event::HeartbeatDue).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_heartbeat(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.abort();
        }
    }

    async fn shutdown(&mut self) {
        tracing::info!("Closing chat session");
        self.stop_heartbeat();
        if let Some(reconnect) = self.reconnect.take() {
            reconnect.abort();
        }

        if let Some(SocketHandle { id, outbound, task }) = self.socket.take() {
            // a closed outbound channel tells the socket task to close
            drop(outbound);
            if tokio::time::timeout(CLOSE_TIMEOUT, task).await.is_err() {
                tracing::debug!("Socket {} did not close in time", id);
            }
        }
    }
}

/// Drive one socket until it closes, reporting to the supervisor.
async fn run_socket(
    url: String,
    socket: SocketId,
    connect_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<Event>,
) {
    let stream = match tokio::time::timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((stream, response))) => {
            tracing::debug!("Socket {} handshake done ({})", socket, response.status());
            stream
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to connect socket {}: {}", socket, e);
            let _ = events.send(Event::Closed {
                socket,
                was_clean: false,
            });
            return;
        }
        Err(_) => {
            tracing::warn!(
                "Socket {} handshake timed out after {}ms",
                socket,
                connect_timeout.as_millis()
            );
            let _ = events.send(Event::Closed {
                socket,
                was_clean: false,
            });
            return;
        }
    };
    let _ = events.send(Event::Opened { socket });

    let (mut write, mut read) = stream.split();

    let was_clean = loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(message) => {
                    if let Err(e) = write.send(message).await {
                        tracing::warn!("Socket {} write error: {}", socket, e);
                        break false;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    drain_until_closed(&mut read).await;
                    break true;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(Event::Frame {
                        socket,
                        text: text.as_str().to_owned(),
                    });
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Ignoring {} bytes of binary data on socket {}", data.len(), socket);
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("Server closed socket {}: {:?}", socket, frame);
                    drain_until_closed(&mut read).await;
                    break true;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Socket {} read error: {}", socket, e);
                    break false;
                }
                None => {
                    tracing::warn!("Socket {} ended without close frame", socket);
                    break false;
                }
            }
        }
    };

    let _ = events.send(Event::Closed { socket, was_clean });
}

/// Keep reading so the close handshake completes, bounded by [`CLOSE_TIMEOUT`].
async fn drain_until_closed<S>(read: &mut S)
where
    S: StreamExt + Unpin,
{
    let _ = tokio::time::timeout(CLOSE_TIMEOUT, async {
        while read.next().await.is_some() {}
    })
    .await;
}
