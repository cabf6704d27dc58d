//! Per-player state owned by the coordinator's registry.
//!
//! The I/O side of a connection (reader and writer tasks) lives in
//! `servers::mud::client`; this is the half the world logic sees.

use std::fmt;

use tokio::sync::mpsc;

use super::types::RoomId;

/// Unique per accepted connection, never reused while the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text queued for a connection's writer task.
pub type Outbox = mpsc::UnboundedSender<String>;

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    /// Current room. Only the coordinator changes it.
    pub room: RoomId,
    /// Recall target.
    pub home: RoomId,
    /// Sole sender for this connection's writer. Dropping the session closes
    /// the channel, which is the writer's only shutdown signal.
    outbox: Outbox,
}

impl Session {
    pub fn new(id: SessionId, name: impl Into<String>, start: RoomId, outbox: Outbox) -> Self {
        Self {
            id,
            name: name.into(),
            room: start,
            home: start,
            outbox,
        }
    }

    /// Queue text for this player. Delivery to a writer that already exited
    /// is silently dropped; its close event is on the way.
    pub fn send(&self, text: impl Into<String>) {
        let _ = self.outbox.send(text.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_home() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = Session::new(SessionId(7), "Alice", RoomId(3), tx);
        assert_eq!(session.room, session.home);
        assert_eq!(session.id.to_string(), "7");
    }

    #[test]
    fn test_send_queues_verbatim() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Session::new(SessionId(1), "Alice", RoomId(0), tx);
        session.send("hello\n");
        assert_eq!(rx.try_recv().unwrap(), "hello\n");
    }

    #[test]
    fn test_drop_closes_outbox() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Session::new(SessionId(1), "Alice", RoomId(0), tx);
        drop(session);
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }

    #[test]
    fn test_send_after_receiver_gone_is_harmless() {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(SessionId(1), "Alice", RoomId(0), tx);
        drop(rx);
        session.send("nobody listening\n");
    }
}
