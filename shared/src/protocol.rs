//! Relay wire contract.
//!
//! Frames are JSON arrays `["event:name", payload]`. Event names are the
//! contract; payload shapes are the serde types below. The relay is a plain
//! rebroadcaster, so payload contents are trusted past the decode boundary —
//! only frame/JSON-level errors are surfaced by [`ServerEvent::decode`].
//!
//! Identity creation is an explicit request/response pair: `user:create`
//! carries a monotonic sequence number and the relay answers with a
//! `user:created` acknowledgment echoing it, so an acknowledgment from a
//! superseded request can be detected and discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::Transform;

pub const USER_CREATE: &str = "user:create";
pub const USER_CREATED: &str = "user:created";
pub const USER_CHANGE: &str = "user:change";
pub const USER_LIST: &str = "user:list";
pub const MESSAGE_CREATE: &str = "message:create";
pub const MESSAGE_CREATED: &str = "message:created";

/// One connected participant as it travels on the wire.
///
/// `rotation` is the canonical Euler XYZ triple of a yaw-only orientation
/// (see `transform` module docs).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl User {
    /// Fresh user at the given pose.
    pub fn new(id: String, name: String, transform: &Transform) -> Self {
        Self {
            id,
            name,
            position: transform.wire_position(),
            rotation: transform.wire_rotation(),
        }
    }
}

/// Chat entry. Immutable once created; the log is append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub name: String,
    /// Sender's user id.
    pub id: String,
    pub text: String,
}

/// Full authoritative roster broadcast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterUpdate {
    pub users: Vec<User>,
    /// Id of the client whose change triggered the broadcast. Recipients skip
    /// broadcasts they originated themselves.
    pub id: String,
}

/// `user:create` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub seq: u64,
    pub user: User,
}

/// `user:created` payload: the server-confirmed identity, echoing the
/// request's sequence number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateAck {
    pub seq: u64,
    pub user: User,
}

/// Outbound events (client → relay).
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    UserCreate(CreateRequest),
    UserChange(User),
    MessageCreate(ChatMessage),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::UserCreate(_) => USER_CREATE,
            ClientEvent::UserChange(_) => USER_CHANGE,
            ClientEvent::MessageCreate(_) => MESSAGE_CREATE,
        }
    }

    /// Encode as a `["event", payload]` frame.
    pub fn encode(&self) -> serde_json::Result<String> {
        let payload = match self {
            ClientEvent::UserCreate(request) => serde_json::to_value(request)?,
            ClientEvent::UserChange(user) => serde_json::to_value(user)?,
            ClientEvent::MessageCreate(message) => serde_json::to_value(message)?,
        };
        serde_json::to_string(&(self.name(), payload))
    }
}

/// Inbound events (relay → client).
#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    UserCreated(CreateAck),
    UserList(RosterUpdate),
    MessageCreated(ChatMessage),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

impl ServerEvent {
    /// Decode a `["event", payload]` frame.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let (name, payload): (String, serde_json::Value) = serde_json::from_str(text)?;
        match name.as_str() {
            USER_CREATED => Ok(ServerEvent::UserCreated(serde_json::from_value(payload)?)),
            USER_LIST => Ok(ServerEvent::UserList(serde_json::from_value(payload)?)),
            MESSAGE_CREATED => Ok(ServerEvent::MessageCreated(serde_json::from_value(payload)?)),
            other => Err(DecodeError::UnknownEvent(other.to_string())),
        }
    }
}
