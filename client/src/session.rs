//! User/session store: local identity, remote roster, chat log, and
//! throttled outbound state pushes.
//!
//! # State machine
//! `Disconnected` → (transport connect) → `Identifying`: a local user is
//! synthesized and a `user:create` request goes out tagged with a monotonic
//! sequence number. `Identifying` → (matching `user:created` ack) → `Active`:
//! the local user is replaced wholesale with the server-confirmed record.
//! A disconnect returns to `Disconnected` but retains the user and roster in
//! memory so a reconnect resumes without visual popping; the next connect
//! runs a fresh identify cycle, and acks from superseded cycles are
//! discarded by their stale sequence number.
//!
//! # Invariant
//! Exactly one user in this process is "mine" (`user`); the remote roster
//! never contains the local id. Roster broadcasts are applied by wholesale
//! replacement, never merge-by-id, which makes repeated identical broadcasts
//! trivially idempotent.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use shared::Transform;
use shared::constants::{UPDATE_SEND_INTERVAL, UPDATE_SEND_INTERVAL_MIN};
use shared::protocol::{ChatMessage, ClientEvent, CreateRequest, RosterUpdate, User};

use crate::transport::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Identifying,
    Active,
}

/// Rate limiter for outbound state pushes. Leading-edge: the first push after
/// a full window goes out immediately, later pushes inside the window wait.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// True when an emission is allowed at `now`; records the emission.
    pub fn allow(&mut self, now: Instant) -> bool {
        match self.last_sent {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }
}

pub struct Session {
    /// The local user. Authoritative locally until an ack replaces it.
    pub user: User,
    /// Remote roster; never contains `user.id`.
    pub users: Vec<User>,
    /// Append-only chat log; broadcast order is trusted as delivery order.
    pub messages: Vec<ChatMessage>,
    state: ConnectionState,
    throttle: Throttle,
    /// Set when local state changed inside a throttle window; flushed on the
    /// next allowed tick so the most recent state always goes out.
    pending_update: bool,
    /// Monotonic identity-request sequence for stale-ack detection.
    create_seq: u64,
}

impl Session {
    pub fn new(name: String) -> Self {
        Self::with_throttle(name, UPDATE_SEND_INTERVAL)
    }

    /// Session with a custom outbound interval, floored at
    /// [`UPDATE_SEND_INTERVAL_MIN`] so the relay never sees more than 60
    /// pushes per second.
    pub fn with_throttle(name: String, interval: Duration) -> Self {
        Self {
            user: User::new(timestamp_id(), name, &Transform::identity()),
            users: Vec::new(),
            messages: Vec::new(),
            state: ConnectionState::Disconnected,
            throttle: Throttle::new(interval.max(UPDATE_SEND_INTERVAL_MIN)),
            pending_update: false,
            create_seq: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Transport came up: run an identify cycle, keeping the current name and
    /// pose so a reconnect resumes where the last session left off.
    pub fn handle_connect(&mut self, transport: &mut dyn Transport) {
        let name = self.user.name.clone();
        self.create_user(name, transport);
    }

    /// Register a (fresh) local identity with the relay. The local user is
    /// replaced optimistically; the ack confirms or reassigns it.
    pub fn create_user(&mut self, name: String, transport: &mut dyn Transport) {
        self.create_seq += 1;
        let user = User {
            id: timestamp_id(),
            name,
            position: self.user.position,
            rotation: self.user.rotation,
        };
        self.user = user.clone();
        self.state = ConnectionState::Identifying;
        if let Err(err) = transport.send(ClientEvent::UserCreate(CreateRequest {
            seq: self.create_seq,
            user,
        })) {
            warn!("user:create push failed: {err}");
        }
    }

    /// Server-confirmed identity. An ack whose sequence number does not match
    /// the latest request belongs to a superseded cycle and is dropped.
    pub fn handle_create_ack(&mut self, seq: u64, user: User) {
        if seq != self.create_seq {
            debug!(
                "discarding stale identity ack (seq {seq}, current {})",
                self.create_seq
            );
            return;
        }
        self.user = user;
        self.state = ConnectionState::Active;
        // The confirmed id may differ from the optimistic one; re-filter so
        // the roster can never hold our own entry.
        let id = self.user.id.clone();
        self.users.retain(|u| u.id != id);
    }

    /// Full roster broadcast: replace wholesale, excluding ourselves.
    ///
    /// `id` names the client whose change triggered the broadcast. When that
    /// is us, the whole broadcast is skipped — our local record is already
    /// ahead of it. Any other originator stays in the roster like everyone
    /// else.
    pub fn handle_user_list(&mut self, roster: RosterUpdate) {
        let RosterUpdate { users, id } = roster;
        if id == self.user.id {
            return;
        }
        self.users = users.into_iter().filter(|u| u.id != self.user.id).collect();
    }

    /// Chat broadcast: append in delivery order, no dedup.
    pub fn handle_message_created(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Transport dropped. User and roster stay in memory; the next connect
    /// re-identifies.
    pub fn handle_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Optimistic rename, then fire-and-forget broadcast. No rollback.
    pub fn change_user_name(&mut self, name: String, transport: &mut dyn Transport) {
        self.user.name = name;
        if let Err(err) = transport.send(ClientEvent::UserChange(self.user.clone())) {
            warn!("user:change push failed: {err}");
        }
    }

    pub fn send_message(&mut self, text: String, transport: &mut dyn Transport) {
        let message = ChatMessage {
            name: self.user.name.clone(),
            id: self.user.id.clone(),
            text,
        };
        if let Err(err) = transport.send(ClientEvent::MessageCreate(message)) {
            warn!("message:create push failed: {err}");
        }
    }

    /// Record the avatar's committed pose and push it, throttled. Inside a
    /// throttle window only the local record is updated; the most recent
    /// state is sent once the window reopens (see [`Self::flush_updates`]).
    pub fn update_user_data(
        &mut self,
        transform: &Transform,
        transport: &mut dyn Transport,
        now: Instant,
    ) {
        self.user.position = transform.wire_position();
        self.user.rotation = transform.wire_rotation();
        self.pending_update = true;
        self.flush_updates(transport, now);
    }

    /// Emit the latest pending state if the throttle allows it. Called every
    /// tick so state recorded mid-window still goes out.
    pub fn flush_updates(&mut self, transport: &mut dyn Transport, now: Instant) {
        if !self.pending_update || !self.throttle.allow(now) {
            return;
        }
        self.pending_update = false;
        if let Err(err) = transport.send(ClientEvent::UserChange(self.user.clone())) {
            warn!("user:change push failed: {err}");
        }
    }
}

/// Client-generated identity token: milliseconds since the epoch, as the
/// relay contract expects an opaque string.
fn timestamp_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use shared::Vec3;
    use shared::protocol::{USER_CHANGE, USER_CREATE};

    fn remote(id: &str) -> User {
        User::new(id.into(), format!("remote-{id}"), &Transform::identity())
    }

    fn roster(users: Vec<User>, originator: &str) -> RosterUpdate {
        RosterUpdate {
            users,
            id: originator.into(),
        }
    }

    #[test]
    fn connect_emits_a_create_request_and_enters_identifying() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();

        session.handle_connect(&mut transport);
        assert_eq!(session.state(), ConnectionState::Identifying);

        let sent = transport.sent_named(USER_CREATE);
        assert_eq!(sent.len(), 1);
        match sent[0] {
            ClientEvent::UserCreate(request) => {
                assert_eq!(request.seq, 1);
                assert_eq!(request.user.name, "Guest42");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn matching_ack_replaces_the_local_user_wholesale() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();
        session.handle_connect(&mut transport);

        let confirmed = remote("server-assigned");
        session.handle_create_ack(1, confirmed.clone());
        assert_eq!(session.state(), ConnectionState::Active);
        assert_eq!(session.user, confirmed);
    }

    #[test]
    fn stale_ack_from_a_superseded_cycle_is_discarded() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();

        session.handle_connect(&mut transport);
        session.handle_disconnect();
        session.handle_connect(&mut transport); // seq 2 supersedes seq 1

        let stale = remote("stale");
        session.handle_create_ack(1, stale);
        assert_eq!(session.state(), ConnectionState::Identifying);
        assert_ne!(session.user.id, "stale");

        let fresh = remote("fresh");
        session.handle_create_ack(2, fresh.clone());
        assert_eq!(session.user, fresh);
    }

    #[test]
    fn roster_broadcasts_never_leave_the_local_id_in_the_remote_roster() {
        let mut session = Session::new("Guest42".into());
        let local_id = session.user.id.clone();

        // Arbitrary sequence of broadcasts, every one echoing the local user.
        for round in 0..3 {
            let users = vec![
                remote("a"),
                remote(&local_id),
                remote(&format!("b{round}")),
            ];
            session.handle_user_list(roster(users, "a"));
            assert!(session.users.iter().all(|u| u.id != local_id));
            assert_eq!(session.users.len(), 2);
        }
    }

    #[test]
    fn a_newly_joined_originator_stays_in_the_roster() {
        // A join broadcast is originated by the joining client itself; its
        // entry must survive the self-filter on every other client.
        let mut session = Session::new("Guest42".into());
        session.handle_user_list(roster(vec![remote("b")], "b"));
        assert_eq!(session.users.len(), 1);
        assert_eq!(session.users[0].id, "b");
    }

    #[test]
    fn self_originated_broadcasts_are_skipped_wholesale() {
        let mut session = Session::new("Guest42".into());
        let local_id = session.user.id.clone();
        session.handle_user_list(roster(vec![remote("a")], "b"));
        assert_eq!(session.users.len(), 1);

        // The echo of our own change must not touch the roster at all.
        session.handle_user_list(roster(vec![], &local_id));
        assert_eq!(session.users.len(), 1);
    }

    #[test]
    fn repeated_identical_broadcasts_do_not_duplicate_entries() {
        let mut session = Session::new("Guest42".into());
        let update = roster(vec![remote("a"), remote("b")], "a");

        session.handle_user_list(update.clone());
        session.handle_user_list(update);
        assert_eq!(session.users.len(), 2);
    }

    #[test]
    fn reconnect_identity_cycle_never_duplicates_the_local_entry() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();

        session.handle_connect(&mut transport);
        let first_id = session.user.id.clone();
        session.handle_create_ack(1, session.user.clone());
        session.handle_user_list(roster(vec![remote("a"), remote(&first_id)], "a"));

        // Reconnect: fresh cycle, server confirms the previous id again.
        session.handle_disconnect();
        session.handle_connect(&mut transport);
        session.handle_create_ack(2, remote(&first_id));

        assert!(session.users.iter().all(|u| u.id != session.user.id));
        assert_eq!(session.users.len(), 1);
    }

    #[test]
    fn disconnect_retains_user_and_roster() {
        let mut session = Session::new("Guest42".into());
        session.handle_user_list(roster(vec![remote("a")], "a"));

        session.handle_disconnect();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.users.len(), 1);
        assert_eq!(session.user.name, "Guest42");
    }

    #[test]
    fn a_burst_within_one_throttle_window_emits_exactly_once_with_last_values() {
        let mut session = Session::with_throttle("Guest42".into(), Duration::from_millis(100));
        let mut transport = MockTransport::default();
        let t0 = Instant::now();

        // Prime the throttle so the burst starts inside a closed window.
        session.update_user_data(
            &Transform::new(Vec3::new(0.0, 0.0, 0.0), 0.0),
            &mut transport,
            t0,
        );
        assert_eq!(transport.sent_named(USER_CHANGE).len(), 1);

        // Burst of intermediate states, all inside the window: dropped.
        for i in 1..=5u64 {
            session.update_user_data(
                &Transform::new(Vec3::new(0.0, 0.0, i as f32), 0.0),
                &mut transport,
                t0 + Duration::from_millis(i * 10),
            );
        }
        assert_eq!(transport.sent_named(USER_CHANGE).len(), 1);

        // Window reopens: exactly one emission carrying the last state.
        session.flush_updates(&mut transport, t0 + Duration::from_millis(100));
        let sent = transport.sent_named(USER_CHANGE);
        assert_eq!(sent.len(), 2);
        match sent[1] {
            ClientEvent::UserChange(user) => assert_eq!(user.position, [0.0, 0.0, 5.0]),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn throttle_interval_is_floored_at_the_minimum() {
        // A below-minimum interval must not let pushes through faster than
        // the 16 ms floor.
        let mut session = Session::with_throttle("Guest42".into(), Duration::from_millis(1));
        let mut transport = MockTransport::default();
        let t0 = Instant::now();

        session.update_user_data(&Transform::identity(), &mut transport, t0);
        session.update_user_data(
            &Transform::new(Vec3::new(0.0, 0.0, 1.0), 0.0),
            &mut transport,
            t0 + Duration::from_millis(5),
        );
        assert_eq!(transport.sent_named(USER_CHANGE).len(), 1);

        session.flush_updates(&mut transport, t0 + UPDATE_SEND_INTERVAL_MIN);
        assert_eq!(transport.sent_named(USER_CHANGE).len(), 2);
    }

    #[test]
    fn flush_without_pending_state_sends_nothing() {
        let mut session = Session::with_throttle("Guest42".into(), Duration::from_millis(100));
        let mut transport = MockTransport::default();
        session.flush_updates(&mut transport, Instant::now());
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn name_change_applies_locally_and_broadcasts_without_roster_duplicates() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();

        session.change_user_name("Alice".into(), &mut transport);
        assert_eq!(session.user.name, "Alice");
        assert!(session.users.is_empty());

        let sent = transport.sent_named(USER_CHANGE);
        assert_eq!(sent.len(), 1);
        match sent[0] {
            ClientEvent::UserChange(user) => assert_eq!(user.name, "Alice"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn chat_broadcasts_append_in_delivery_order() {
        let mut session = Session::new("Guest42".into());
        for text in ["first", "second", "third"] {
            session.handle_message_created(ChatMessage {
                name: "a".into(),
                id: "a".into(),
                text: text.into(),
            });
        }
        let texts: Vec<_> = session.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn send_message_carries_the_local_identity() {
        let mut session = Session::new("Guest42".into());
        let mut transport = MockTransport::default();

        session.send_message("hello".into(), &mut transport);
        match &transport.sent[0] {
            ClientEvent::MessageCreate(message) => {
                assert_eq!(message.name, "Guest42");
                assert_eq!(message.id, session.user.id);
                assert_eq!(message.text, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
