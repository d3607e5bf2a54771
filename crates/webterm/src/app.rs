//! Interactive front-end driving one session.

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use webterm_core::{ClientConfig, Error, SessionState, TransportEvent};
use webterm_detector::LineClassifier;
use webterm_session::{Session, SessionEvent, TokioScheduler};
use webterm_transport::WebSocketTransport;

use crate::command::{Input, HELP};
use crate::render::{status_line, Renderer};

/// Whether the REPL keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the loop
    Quit,
}

/// Owns the session and the single event channel feeding it.
#[derive(Debug)]
pub struct App {
    session: Session,
    renderer: Renderer,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl App {
    /// Wire a session to the WebSocket transport and tokio timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let classifier = LineClassifier::from_settings(&config.detection)?;
        let (event_tx, events) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        let runtime = Handle::current();
        runtime.spawn(forward_transport_events(transport_rx, event_tx.clone()));

        let transport = WebSocketTransport::new(config.transport.clone(), transport_tx);
        let scheduler = TokioScheduler::new(runtime, event_tx);
        let session = Session::new(
            config.session.clone(),
            classifier.clone(),
            Box::new(transport),
            Box::new(scheduler),
        );

        info!(
            "Client ready: endpoint={}, strategies={:?}",
            config.transport.endpoint,
            classifier.pipeline().strategy_names()
        );

        Ok(Self::with_session(
            session,
            Renderer::new(classifier, std::io::stdout().is_terminal()),
            events,
        ))
    }

    /// Build around an existing session and event receiver.
    pub fn with_session(
        session: Session,
        renderer: Renderer,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            session,
            renderer,
            events,
        }
    }

    /// The driven session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one line of user input and print what changed.
    pub fn handle_input(&mut self, line: &str, out: &mut impl Write) -> std::io::Result<Flow> {
        let input = Input::parse(line);
        debug!("Input: {:?}", input);

        let result = match input {
            Input::Submit(text) => self.session.submit(&text),
            Input::Connect(raw) => self.session.connect(&raw),
            Input::Disconnect => self.session.disconnect(),
            Input::Interrupt => self.session.interrupt(),
            Input::Clear => {
                self.session.clear_log();
                Ok(())
            }
            Input::Previous => {
                let recalled = self.session.recall_previous().to_string();
                writeln!(out, "{recalled}")?;
                Ok(())
            }
            Input::Next => {
                let recalled = self.session.recall_next().to_string();
                writeln!(out, "{recalled}")?;
                Ok(())
            }
            Input::History => {
                for (index, entry) in self.session.history().iter().enumerate() {
                    writeln!(out, "{:>4}  {entry}", index + 1)?;
                }
                Ok(())
            }
            Input::Status => {
                writeln!(out, "{}", status_line(&self.session))?;
                Ok(())
            }
            Input::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            Input::Quit => {
                self.shutdown();
                self.flush_log(out)?;
                return Ok(Flow::Quit);
            }
            Input::Unknown(name) => {
                writeln!(out, "{}", self.renderer.error(&format!("unknown command :{name}")))?;
                Ok(())
            }
        };

        self.flush_log(out)?;
        if let Err(err @ (Error::Descriptor(_) | Error::InvalidState { .. })) = result {
            writeln!(out, "{}", self.renderer.error(&err.to_string()))?;
        }
        Ok(Flow::Continue)
    }

    /// Apply one transport or timer event and print new lines.
    pub fn handle_event(&mut self, event: SessionEvent, out: &mut impl Write) -> std::io::Result<()> {
        self.session.handle_event(event);
        self.flush_log(out)
    }

    /// Disconnect if a connection is live or pending.
    pub fn shutdown(&mut self) {
        if !matches!(self.session.state(), SessionState::Idle | SessionState::Closed) {
            let _ = self.session.disconnect();
        }
    }

    /// Run until `:quit`, end of input or a fatal I/O error.
    pub async fn run(&mut self) -> Result<()> {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = std::io::stdout();

        writeln!(stdout, "webterm {} - type :help for commands", env!("CARGO_PKG_VERSION"))?;
        self.flush_log(&mut stdout)?;

        loop {
            tokio::select! {
                line = stdin.next_line() => match line? {
                    Some(line) => {
                        if self.handle_input(&line, &mut stdout)? == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        debug!("End of input");
                        self.shutdown();
                        self.flush_log(&mut stdout)?;
                        break;
                    }
                },
                Some(event) = self.events.recv() => self.handle_event(event, &mut stdout)?,
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    self.handle_input(":interrupt", &mut stdout)?;
                }
            }
        }

        Ok(())
    }

    fn flush_log(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        for line in self.session.log_mut().read_since_last() {
            writeln!(out, "{}", self.renderer.render(line))?;
        }
        out.flush()
    }
}

async fn forward_transport_events(
    mut transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(event) = transport_rx.recv().await {
        if events.send(event.into()).is_err() {
            break;
        }
    }
}
