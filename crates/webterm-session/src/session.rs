//! Remote terminal session state machine.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use webterm_core::{
    ConnectRequest, ConnectionDescriptor, Error, Result, SessionId, SessionSettings,
    SessionState, TerminalLine, TransportError, TransportEvent,
};
use webterm_detector::LineClassifier;
use webterm_transport::Transport;

use crate::event::SessionEvent;
use crate::history::CommandHistory;
use crate::input::InputController;
use crate::log::TerminalLog;
use crate::scheduler::{Scheduler, Timer, TimerHandle};
use crate::timer::SessionTimer;

/// Marker appended after the prompt when an interrupt is sent.
const INTERRUPT_MARKER: &str = "^C";

/// A remote shell session driven by user operations and [`SessionEvent`]s.
///
/// Every method applies one event atomically. Nothing here blocks or spawns;
/// the transport and scheduler report back through the event channel the
/// owner feeds into [`handle_event`](Self::handle_event).
pub struct Session {
    /// Session identifier
    id: SessionId,

    /// Lifecycle state
    state: SessionState,

    /// Target of the current or last attempt. The secret is kept only while connecting.
    descriptor: Option<ConnectionDescriptor>,

    /// When the current connection was established
    connected_at: Option<DateTime<Utc>>,

    /// Prompt shown before typed commands
    current_prompt: String,

    /// Banner text of the most recent surfaced error
    last_error: Option<String>,

    /// Connection attempt counter; timers from older attempts are stale
    attempt: u64,

    /// Whether the single host-fallback retry was used for this attempt
    retried: bool,

    connect_timeout: Option<TimerHandle>,
    retry: Option<TimerHandle>,
    timer: Option<SessionTimer>,

    log: TerminalLog,
    input: InputController,
    classifier: LineClassifier,
    transport: Box<dyn Transport>,
    scheduler: Box<dyn Scheduler>,
    settings: SessionSettings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("descriptor", &self.descriptor)
            .field("attempt", &self.attempt)
            .field("lines", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an idle session.
    pub fn new(
        settings: SessionSettings,
        classifier: LineClassifier,
        transport: Box<dyn Transport>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        let id = SessionId::new();
        info!("Creating session: id={}", id);

        Self {
            id,
            state: SessionState::Idle,
            descriptor: None,
            connected_at: None,
            current_prompt: settings.default_prompt.clone(),
            last_error: None,
            attempt: 0,
            retried: false,
            connect_timeout: None,
            retry: None,
            timer: None,
            log: TerminalLog::new(),
            input: InputController::with_history_limit(settings.history_limit),
            classifier,
            transport,
            scheduler,
            settings,
        }
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Target of the current or last connection attempt.
    pub fn descriptor(&self) -> Option<&ConnectionDescriptor> {
        self.descriptor.as_ref()
    }

    /// When the current connection was established.
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    /// Prompt prefixed to typed commands.
    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    /// Most recent surfaced error.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current connection attempt number.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Session transcript.
    pub fn log(&self) -> &TerminalLog {
        &self.log
    }

    /// Session transcript, for readers tracking unread lines.
    pub fn log_mut(&mut self) -> &mut TerminalLog {
        &mut self.log
    }

    /// Input line being edited.
    pub fn input(&self) -> &str {
        self.input.input()
    }

    /// Replace the input line.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input.set_input(text);
    }

    /// Submitted commands.
    pub fn history(&self) -> &CommandHistory {
        self.input.history()
    }

    /// Start connecting to a `HOST:USERNAME:PASSWORD` target.
    ///
    /// Valid from `Idle`, `Closed` and `Failed`. A malformed descriptor leaves
    /// the state unchanged and never reaches the transport.
    pub fn connect(&mut self, raw: &str) -> Result<()> {
        if !self.state.can_connect() {
            return Err(self.reject(Error::InvalidState {
                operation: "connect",
                state: self.state,
            }));
        }

        let descriptor = match ConnectionDescriptor::parse_with_port(raw, self.settings.default_port)
        {
            Ok(descriptor) => descriptor,
            Err(e) => return Err(self.reject(e.into())),
        };

        self.cancel_timers();
        self.last_error = None;
        self.attempt += 1;
        self.retried = false;
        self.connected_at = None;

        info!(
            "Connecting session: id={}, target={}, attempt={}",
            self.id,
            descriptor.target(),
            self.attempt
        );
        self.set_state(SessionState::Connecting);
        self.log.append(TerminalLine::system(format!(
            "Connecting to {}...",
            descriptor.target()
        )));

        self.connect_timeout = Some(self.scheduler.schedule(
            self.settings.connect_timeout(),
            Timer::ConnectTimeout {
                attempt: self.attempt,
            },
        ));

        let request = ConnectRequest::from_descriptor(&descriptor, false);
        self.descriptor = Some(descriptor);

        if let Err(err) = self.transport.connect(request) {
            self.fail(&err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Close the session. Idempotent once closed.
    pub fn disconnect(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle => {
                return Err(self.reject(Error::InvalidState {
                    operation: "disconnect",
                    state: self.state,
                }))
            }
            SessionState::Closed => {
                debug!("Session already closed: id={}", self.id);
                return Ok(());
            }
            _ => {}
        }

        let was_live = self.state.is_active();
        self.set_state(SessionState::Closing);
        self.cancel_timers();
        self.stop_timer();
        self.transport.disconnect();

        self.forget_secret();
        self.current_prompt = self.settings.default_prompt.clone();
        self.set_state(SessionState::Closed);
        if was_live {
            self.log.append(TerminalLine::system("Disconnected"));
        }
        Ok(())
    }

    /// Apply one transport or timer event.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Transport(event) => self.handle_transport(event),
            SessionEvent::Timer(timer) => self.handle_timer(timer),
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        match (self.state, event) {
            (SessionState::Connecting, TransportEvent::Connected) => self.on_connected(),
            (SessionState::Connecting, TransportEvent::Error(err)) => {
                if err.is_host_fallback() && !self.retried {
                    self.schedule_retry(&err);
                } else {
                    self.fail(&err.to_string());
                }
            }
            (SessionState::Connected, TransportEvent::Error(err)) => self.fail(&err.to_string()),
            (SessionState::Connecting | SessionState::Connected, TransportEvent::Data(chunk)) => {
                self.on_data(&chunk)
            }
            (SessionState::Connected, TransportEvent::Closed(message)) => self.on_closed(&message),
            (SessionState::Connecting, TransportEvent::Closed(message)) => {
                self.fail(&format!("Connection closed: {message}"))
            }
            (state, event) => {
                debug!(
                    "Ignoring transport event in state {}: id={}, event={:?}",
                    state, self.id, event
                );
            }
        }
    }

    fn handle_timer(&mut self, timer: Timer) {
        if timer.attempt() != self.attempt {
            debug!("Ignoring stale timer: id={}, timer={:?}", self.id, timer);
            return;
        }

        match (self.state, timer) {
            (SessionState::Connecting, Timer::ConnectTimeout { .. }) => {
                self.connect_timeout = None;
                let err = Error::ConnectTimeout(self.settings.connect_timeout_secs);
                warn!("Connect timed out: id={}", self.id);
                self.fail(&err.to_string());
            }
            (SessionState::Connecting, Timer::RetryConnect { .. }) => {
                self.retry = None;
                self.send_retry();
            }
            (SessionState::Connected, Timer::Tick { .. }) => {
                if let Some(timer) = self.timer.as_mut() {
                    timer.refresh(Utc::now());
                }
            }
            (state, timer) => {
                debug!(
                    "Ignoring timer in state {}: id={}, timer={:?}",
                    state, self.id, timer
                );
            }
        }
    }

    fn on_connected(&mut self) {
        if let Some(handle) = self.connect_timeout.take() {
            handle.cancel();
        }
        if let Some(handle) = self.retry.take() {
            handle.cancel();
        }

        let now = Utc::now();
        self.connected_at = Some(now);
        self.forget_secret();
        self.set_state(SessionState::Connected);

        let tick = self.scheduler.schedule_repeating(
            self.settings.tick_interval(),
            Timer::Tick {
                attempt: self.attempt,
            },
        );
        self.timer = Some(SessionTimer::start(now, tick));

        let target = self
            .descriptor
            .as_ref()
            .map(ConnectionDescriptor::target)
            .unwrap_or_default();
        self.log
            .append(TerminalLine::system(format!("Connected to {target}")));
    }

    fn on_data(&mut self, chunk: &str) {
        let outcome = self.classifier.classify(chunk);
        if let Some(prompt) = outcome.prompt {
            if prompt != self.current_prompt {
                debug!("Prompt changed: id={}, prompt={:?}", self.id, prompt);
            }
            self.current_prompt = prompt;
        }
        if let Some(line) = outcome.line {
            self.log.append(line);
        }
    }

    fn on_closed(&mut self, message: &str) {
        info!("Remote shell closed: id={}, message={}", self.id, message);
        self.cancel_timers();
        self.stop_timer();
        self.transport.disconnect();
        self.forget_secret();
        self.current_prompt = self.settings.default_prompt.clone();
        self.set_state(SessionState::Closed);

        let text = if message.is_empty() {
            "Connection closed".to_string()
        } else {
            format!("Connection closed: {message}")
        };
        self.log.append(TerminalLine::system(text));
    }

    fn schedule_retry(&mut self, err: &TransportError) {
        self.retried = true;
        info!(
            "Host fallback reported, retrying once: id={}, message={}",
            self.id,
            err.message()
        );
        self.log.append(TerminalLine::system("Retrying connection..."));
        self.retry = Some(self.scheduler.schedule(
            self.settings.retry_delay(),
            Timer::RetryConnect {
                attempt: self.attempt,
            },
        ));
    }

    fn send_retry(&mut self) {
        let Some(descriptor) = self.descriptor.as_ref() else {
            self.fail("Retry requested without a connection target");
            return;
        };
        let request = ConnectRequest::from_descriptor(descriptor, true);
        if let Err(err) = self.transport.connect(request) {
            self.fail(&err.to_string());
        }
    }

    /// Run a command line on the remote shell.
    ///
    /// Blank input and input while not connected are ignored.
    pub fn submit(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() || self.state != SessionState::Connected {
            debug!(
                "Ignoring submit: id={}, state={}, blank={}",
                self.id,
                self.state,
                text.trim().is_empty()
            );
            return Ok(());
        }

        self.log
            .append(TerminalLine::command(format!("{}{}", self.current_prompt, text)));
        self.input.commit(text);

        if let Err(err) = self.transport.send_command(text) {
            self.fail(&err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Send Ctrl-C to the remote shell. Ignored unless connected.
    pub fn interrupt(&mut self) -> Result<()> {
        if self.state != SessionState::Connected {
            debug!("Ignoring interrupt: id={}, state={}", self.id, self.state);
            return Ok(());
        }

        self.log.append(TerminalLine::command(format!(
            "{}{}",
            self.current_prompt, INTERRUPT_MARKER
        )));
        self.input.clear();

        if let Err(err) = self.transport.send_interrupt() {
            self.fail(&err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Replace the transcript with a single notice.
    pub fn clear_log(&mut self) {
        self.log.clear_with(TerminalLine::system("Terminal cleared"));
    }

    /// Load the next older history entry into the input line.
    pub fn recall_previous(&mut self) -> &str {
        self.input.recall_previous()
    }

    /// Load the next newer history entry, or clear the input line.
    pub fn recall_next(&mut self) -> &str {
        self.input.recall_next()
    }

    /// Connection duration as `HH:MM:SS`, refreshed on every tick.
    pub fn elapsed_display(&self) -> Option<&str> {
        self.timer.as_ref().map(SessionTimer::display)
    }

    /// Connection duration at `now`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.timer.as_ref().map(|timer| timer.elapsed_at(now))
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            info!(
                "Session state changed: id={}, {} → {}",
                self.id, self.state, state
            );
            self.state = state;
        }
    }

    /// Record a locally rejected operation. The state is left untouched.
    fn reject(&mut self, err: Error) -> Error {
        warn!("Operation rejected: id={}, error={}", self.id, err);
        self.last_error = Some(err.to_string());
        err
    }

    /// Tear down the attempt and surface `message`.
    fn fail(&mut self, message: &str) {
        warn!("Session failed: id={}, error={}", self.id, message);
        self.cancel_timers();
        self.stop_timer();
        self.transport.disconnect();
        self.forget_secret();
        self.current_prompt = self.settings.default_prompt.clone();
        self.set_state(SessionState::Failed);
        self.last_error = Some(message.to_string());
        self.log.append(TerminalLine::error(message));
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.connect_timeout.take() {
            handle.cancel();
        }
        if let Some(handle) = self.retry.take() {
            handle.cancel();
        }
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn forget_secret(&mut self) {
        if let Some(descriptor) = self.descriptor.as_mut() {
            descriptor.forget_secret();
        }
    }
}
