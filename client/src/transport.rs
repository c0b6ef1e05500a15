//! Relay transport seam.
//!
//! The session only sees the [`Transport`] trait: fire-and-forget sends and a
//! non-blocking inbound poll. [`WsTransport`] is the real WebSocket client;
//! reads never block the simulation loop.

use std::io;
use std::net::TcpStream;

use log::warn;
use shared::protocol::{ClientEvent, ServerEvent};
use thiserror::Error;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket, connect};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    Ws(#[from] Box<tungstenite::Error>),
    #[error("socket configuration failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode outbound event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        TransportError::Ws(Box::new(err))
    }
}

pub trait Transport {
    /// Push one event to the relay. Best-effort: callers log and move on.
    fn send(&mut self, event: ClientEvent) -> Result<(), TransportError>;

    /// Drain currently-buffered inbound events without blocking.
    fn poll(&mut self) -> Vec<ServerEvent>;

    fn is_connected(&self) -> bool;
}

/// WebSocket transport speaking `["event", payload]` JSON text frames.
pub struct WsTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    connected: bool,
}

impl WsTransport {
    pub fn connect(url: &str) -> Result<Self, TransportError> {
        let (socket, _response) = connect(url)?;
        // Reads must not stall the frame loop.
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream.set_nonblocking(true)?;
        }
        Ok(Self {
            socket,
            connected: true,
        })
    }
}

impl Transport for WsTransport {
    fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        let frame = event.encode()?;
        match self.socket.send(Message::Text(frame)) {
            Ok(()) => Ok(()),
            // A send hitting a non-blocking socket mid-write is retried by
            // tungstenite on the next call; everything else drops the link.
            Err(tungstenite::Error::Io(err)) if err.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(err) => {
                self.connected = false;
                Err(err.into())
            }
        }
    }

    fn poll(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => match ServerEvent::decode(&text) {
                    Ok(event) => events.push(event),
                    // Payloads are contract-trusted; only frame-level decode
                    // failures land here and are dropped.
                    Err(err) => warn!("dropping malformed relay frame: {err}"),
                },
                Ok(Message::Close(_)) => {
                    self.connected = false;
                    break;
                }
                // Ping/pong/binary are transport noise.
                Ok(_) => {}
                Err(tungstenite::Error::Io(err)) if err.kind() == io::ErrorKind::WouldBlock => {
                    break;
                }
                Err(err) => {
                    warn!("relay read failed: {err}");
                    self.connected = false;
                    break;
                }
            }
        }
        events
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Scripted transport for tests: records outbound events, serves queued
/// inbound ones.
#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    pub sent: Vec<ClientEvent>,
    pub inbound: std::collections::VecDeque<ServerEvent>,
    pub disconnected: bool,
}

#[cfg(test)]
impl MockTransport {
    pub fn queue(&mut self, event: ServerEvent) {
        self.inbound.push_back(event);
    }

    /// Outbound events matching the given contract name.
    pub fn sent_named(&self, name: &str) -> Vec<&ClientEvent> {
        self.sent.iter().filter(|e| e.name() == name).collect()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        self.sent.push(event);
        Ok(())
    }

    fn poll(&mut self) -> Vec<ServerEvent> {
        self.inbound.drain(..).collect()
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}
