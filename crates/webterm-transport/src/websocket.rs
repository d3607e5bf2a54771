//! WebSocket channel to the shell bridge.
//!
//! [`WebSocketTransport`] owns at most one background task. The task opens
//! the socket, runs the readiness probe, requests the shell and then relays
//! frames in both directions until the bridge goes away or the caller
//! disconnects. Calls on the transport only queue [`ChannelCommand`]s, so
//! they never block the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use webterm_core::{
    ClientMessage, ConnectRequest, Result, ServerMessage, TransportError, TransportEvent,
    TransportSettings,
};

use crate::classify::classify_server_error;
use crate::Transport;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Base delay between channel open attempts, multiplied by the attempt number.
const OPEN_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound on the close handshake after `ssh-disconnect`.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Requests queued from the transport to its channel task.
#[derive(Debug)]
enum ChannelCommand {
    /// Probe and send `ssh-connect` on the open channel
    Establish(ConnectRequest),
    /// Send `ssh-command`
    Command(String),
    /// Send `ssh-interrupt`
    Interrupt,
    /// Send `ssh-disconnect` and close the socket
    Disconnect,
}

/// Event output of one channel task.
///
/// Once detached, nothing else reaches the caller.
#[derive(Debug, Clone)]
struct EventSink {
    tx: mpsc::UnboundedSender<TransportEvent>,
    detached: Arc<AtomicBool>,
}

impl EventSink {
    fn emit(&self, event: TransportEvent) {
        if self.is_detached() {
            debug!("Dropping event from detached channel: {:?}", event);
            return;
        }
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

/// Handle to a running channel task.
#[derive(Debug)]
struct Channel {
    commands: mpsc::UnboundedSender<ChannelCommand>,
    detached: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Channel {
    fn is_live(&self) -> bool {
        !self.task.is_finished() && !self.commands.is_closed()
    }

    fn send(&self, command: ChannelCommand) -> std::result::Result<(), TransportError> {
        self.commands
            .send(command)
            .map_err(|_| TransportError::Channel("channel task stopped".to_string()))
    }
}

/// [`Transport`] over a WebSocket to the shell bridge.
///
/// # Example
/// ```no_run
/// use tokio::sync::mpsc;
/// use webterm_core::{ConnectionDescriptor, ConnectRequest, TransportSettings};
/// use webterm_transport::{Transport, WebSocketTransport};
///
/// # async fn example() -> webterm_core::Result<()> {
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let mut transport = WebSocketTransport::new(TransportSettings::default(), tx);
///
/// let descriptor = ConnectionDescriptor::parse("10.0.0.5:admin:hunter2")?;
/// transport.connect(ConnectRequest::from_descriptor(&descriptor, false))?;
/// while let Some(event) = rx.recv().await {
///     println!("{event:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebSocketTransport {
    settings: TransportSettings,
    events: mpsc::UnboundedSender<TransportEvent>,
    channel: Option<Channel>,
}

impl WebSocketTransport {
    /// Create a transport that reports to `events`. No socket is opened yet.
    pub fn new(settings: TransportSettings, events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            settings,
            events,
            channel: None,
        }
    }

    /// Bridge endpoint this transport connects to.
    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    /// Whether a channel task is currently running.
    pub fn is_open(&self) -> bool {
        self.live_channel().is_some()
    }

    fn live_channel(&self) -> Option<&Channel> {
        self.channel.as_ref().filter(|channel| channel.is_live())
    }

    fn forward(&self, command: ChannelCommand) -> Result<()> {
        let channel = self
            .live_channel()
            .ok_or_else(|| TransportError::Channel("channel is not open".to_string()))?;
        channel.send(command)?;
        Ok(())
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, request: ConnectRequest) -> Result<()> {
        if let Some(channel) = self.live_channel() {
            debug!(
                "Reusing open channel for {}@{}:{}",
                request.username, request.host, request.port
            );
            channel.send(ChannelCommand::Establish(request))?;
            return Ok(());
        }

        let runtime = Handle::try_current()
            .map_err(|e| TransportError::Channel(format!("no async runtime available: {e}")))?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let detached = Arc::new(AtomicBool::new(false));
        let sink = EventSink {
            tx: self.events.clone(),
            detached: Arc::clone(&detached),
        };

        info!("Opening channel to {}", self.settings.endpoint);
        let task = runtime.spawn(run_channel(
            self.settings.clone(),
            request,
            command_rx,
            sink,
        ));

        self.channel = Some(Channel {
            commands,
            detached,
            task,
        });
        Ok(())
    }

    fn send_command(&mut self, command: &str) -> Result<()> {
        debug!("Sending command ({} bytes)", command.len());
        self.forward(ChannelCommand::Command(command.to_string()))
    }

    fn send_interrupt(&mut self) -> Result<()> {
        debug!("Sending interrupt");
        self.forward(ChannelCommand::Interrupt)
    }

    fn disconnect(&mut self) {
        let Some(channel) = self.channel.take() else {
            return;
        };

        info!("Disconnecting channel to {}", self.settings.endpoint);
        channel.detached.store(true, Ordering::SeqCst);
        if channel.send(ChannelCommand::Disconnect).is_err() {
            channel.task.abort();
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.detached.store(true, Ordering::SeqCst);
            channel.task.abort();
        }
    }
}

/// Why a channel task stopped on its own.
#[derive(Debug)]
enum Stop {
    /// The bridge closed the socket or the stream ended
    Ended,
    /// Socket-level failure
    Failed(TransportError),
}

impl From<TransportError> for Stop {
    fn from(err: TransportError) -> Self {
        Self::Failed(err)
    }
}

async fn run_channel(
    settings: TransportSettings,
    request: ConnectRequest,
    commands: mpsc::UnboundedReceiver<ChannelCommand>,
    events: EventSink,
) {
    let stream = match open_socket(&settings, &events).await {
        Ok(stream) => stream,
        Err(err) => {
            error!("Failed to open channel: {}", err);
            events.emit(TransportEvent::Error(err));
            return;
        }
    };

    if events.is_detached() {
        debug!("Channel detached before use");
        return;
    }

    let (sink, reader) = stream.split();
    let mut task = ChannelTask {
        sink,
        reader,
        events: events.clone(),
        settings,
        next_probe_id: 1,
    };

    let outcome = match task.establish(request).await {
        Ok(()) => task.run(commands).await,
        Err(stop) => Err(stop),
    };

    match outcome {
        Ok(()) => debug!("Channel task finished"),
        Err(Stop::Ended) => {
            info!("Channel closed by bridge");
            events.emit(TransportEvent::Closed("channel closed".to_string()));
        }
        Err(Stop::Failed(err)) => {
            error!("Channel failed: {}", err);
            events.emit(TransportEvent::Error(err));
        }
    }
}

/// Open the socket with a capped number of attempts inside the overall open timeout.
async fn open_socket(
    settings: &TransportSettings,
    events: &EventSink,
) -> std::result::Result<WsStream, TransportError> {
    let endpoint = settings.endpoint.as_str();
    let attempts = settings.max_open_attempts.max(1);

    let opening = async {
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            if events.is_detached() {
                return Err(TransportError::Channel("channel detached".to_string()));
            }

            match tokio_tungstenite::connect_async(endpoint).await {
                Ok((stream, _)) => {
                    info!("Channel open to {} (attempt {})", endpoint, attempt);
                    return Ok(stream);
                }
                Err(e) => {
                    warn!(
                        "Channel open attempt {}/{} failed: {}",
                        attempt, attempts, e
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(OPEN_BACKOFF * attempt).await;
            }
        }

        Err(TransportError::Channel(format!(
            "could not open {endpoint} after {attempts} attempt(s): {last_error}"
        )))
    };

    tokio::time::timeout(settings.open_timeout(), opening)
        .await
        .map_err(|_| {
            TransportError::Channel(format!(
                "opening {endpoint} timed out after {}ms",
                settings.open_timeout_ms
            ))
        })?
}

/// State owned by a channel task once the socket is open.
struct ChannelTask {
    sink: SplitSink<WsStream, Message>,
    reader: SplitStream<WsStream>,
    events: EventSink,
    settings: TransportSettings,
    next_probe_id: u64,
}

impl ChannelTask {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<ChannelCommand>,
    ) -> std::result::Result<(), Stop> {
        loop {
            tokio::select! {
                inbound = self.next_inbound() => {
                    if let Some(message) = inbound? {
                        self.deliver(message);
                    }
                }
                command = commands.recv() => match command {
                    Some(ChannelCommand::Establish(request)) => self.establish(request).await?,
                    Some(ChannelCommand::Command(command)) => {
                        self.send(&ClientMessage::SshCommand { command }).await?
                    }
                    Some(ChannelCommand::Interrupt) => {
                        self.send(&ClientMessage::SshInterrupt {}).await?
                    }
                    Some(ChannelCommand::Disconnect) | None => {
                        self.close().await;
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Probe readiness, then request the shell.
    async fn establish(&mut self, request: ConnectRequest) -> std::result::Result<(), Stop> {
        if !self.probe().await? {
            debug!(
                "Bridge not confirmed ready, waiting {}ms",
                self.settings.warmup_delay_ms
            );
            tokio::time::sleep(self.settings.warmup_delay()).await;
        }

        info!(
            "Requesting shell for {}@{}:{}{}",
            request.username,
            request.host,
            request.port,
            if request.is_retry() { " (retry)" } else { "" }
        );
        self.send(&ClientMessage::SshConnect(request)).await
    }

    /// Send `socket-check` and wait for the matching ack.
    ///
    /// Returns `false` when no ack arrives in time or the bridge reports not ready.
    async fn probe(&mut self) -> std::result::Result<bool, Stop> {
        let id = self.next_probe_id;
        self.next_probe_id += 1;

        self.send(&ClientMessage::SocketCheck {
            id,
            timestamp: Utc::now().timestamp_millis(),
        })
        .await?;

        let deadline = tokio::time::sleep(self.settings.probe_timeout());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("No ack for probe {} within {}ms", id, self.settings.probe_timeout_ms);
                    return Ok(false);
                }
                inbound = self.next_inbound() => match inbound? {
                    Some(ServerMessage::SocketCheckAck { id: acked, ready }) if acked == id => {
                        debug!("Probe {} acknowledged, ready={}", id, ready);
                        return Ok(ready);
                    }
                    Some(message) => self.deliver(message),
                    None => {}
                }
            }
        }
    }

    async fn next_inbound(&mut self) -> std::result::Result<Option<ServerMessage>, Stop> {
        match self.reader.next().await {
            Some(Ok(Message::Text(text))) => match ServerMessage::from_frame(&text) {
                Ok(Some(message)) => Ok(Some(message)),
                Ok(None) => {
                    debug!("Ignoring unhandled frame: {}", text);
                    Ok(None)
                }
                Err(e) => {
                    warn!("Malformed frame from bridge: {}", e);
                    Ok(None)
                }
            },
            Some(Ok(Message::Close(frame))) => {
                debug!("Close frame from bridge: {:?}", frame);
                Err(Stop::Ended)
            }
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) => Err(Stop::Failed(TransportError::Channel(e.to_string()))),
            None => Err(Stop::Ended),
        }
    }

    fn deliver(&self, message: ServerMessage) {
        let event = match message {
            ServerMessage::SocketCheckAck { id, .. } => {
                debug!("Ignoring stale ack for probe {}", id);
                return;
            }
            ServerMessage::SshConnected => TransportEvent::Connected,
            ServerMessage::SshError { message } => {
                let err = classify_server_error(&message);
                warn!("Bridge reported error: {}", err);
                TransportEvent::Error(err)
            }
            ServerMessage::SshData { data } => TransportEvent::Data(data),
            ServerMessage::SshClosed { message } => TransportEvent::Closed(message),
        };
        self.events.emit(event);
    }

    async fn send(&mut self, message: &ClientMessage) -> std::result::Result<(), Stop> {
        let frame = message
            .to_frame()
            .map_err(|e| TransportError::Channel(format!("failed to encode frame: {e}")))?;
        debug!("Sending {} frame", message.event_name());
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::Channel(format!("send failed: {e}")))?;
        Ok(())
    }

    async fn close(mut self) {
        if let Err(stop) = self.send(&ClientMessage::SshDisconnect {}).await {
            debug!("ssh-disconnect not delivered: {:?}", stop);
        }
        if tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close())
            .await
            .is_err()
        {
            debug!("Close handshake timed out");
        }
    }
}
