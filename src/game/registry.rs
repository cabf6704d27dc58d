//! Who is online and where.
//!
//! Private to the coordinator task; nothing else holds a reference to it.

use std::collections::HashMap;

use super::session::{Session, SessionId};
use super::types::{RoomId, ZoneId};
use super::world::World;

#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<String, Session>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Session> {
        self.sessions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Session> {
        self.sessions.get_mut(name)
    }

    /// True when `id` is the session currently registered under `name`.
    pub fn is_current(&self, name: &str, id: SessionId) -> bool {
        self.sessions.get(name).is_some_and(|s| s.id == id)
    }

    /// Inserts a session. The caller must have taken out any previous
    /// session of the same name first.
    pub fn insert(&mut self, session: Session) {
        debug_assert!(!self.sessions.contains_key(&session.name));
        self.sessions.insert(session.name.clone(), session);
    }

    /// Removes whatever session is registered under `name`.
    pub fn take(&mut self, name: &str) -> Option<Session> {
        self.sessions.remove(name)
    }

    /// Removes `name` only if it still belongs to session `id`.
    pub fn remove(&mut self, name: &str, id: SessionId) -> Option<Session> {
        if self.is_current(name, id) {
            self.sessions.remove(name)
        } else {
            None
        }
    }

    /// Online names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn in_room(&self, room: RoomId) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(move |s| s.room == room)
    }

    /// Sends to everyone in `room`, optionally skipping one player.
    pub fn send_room(&self, room: RoomId, except: Option<&str>, text: &str) {
        for session in self.in_room(room) {
            if except != Some(session.name.as_str()) {
                session.send(text);
            }
        }
    }

    pub fn send_zone(&self, world: &World, zone: ZoneId, text: &str) {
        for session in self.sessions.values().filter(|s| world.zone_of(s.room) == zone) {
            session.send(text);
        }
    }

    pub fn send_all(&self, text: &str) {
        for session in self.sessions.values() {
            session.send(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session(id: u64, name: &str, room: usize) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(SessionId(id), name, RoomId(room), tx), rx)
    }

    #[test]
    fn test_remove_checks_session_id() {
        let mut registry = Registry::new();
        let (alice, _rx) = session(2, "Alice", 0);
        registry.insert(alice);

        // a stale id from an earlier connection does not evict
        assert!(registry.remove("Alice", SessionId(1)).is_none());
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("Alice", SessionId(2)).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_send_room_except_actor() {
        let mut registry = Registry::new();
        let (alice, mut alice_rx) = session(1, "Alice", 0);
        let (bob, mut bob_rx) = session(2, "Bob", 0);
        let (carol, mut carol_rx) = session(3, "Carol", 1);
        registry.insert(alice);
        registry.insert(bob);
        registry.insert(carol);

        registry.send_room(RoomId(0), Some("Alice"), "hi\n");

        assert!(alice_rx.try_recv().is_err());
        assert_eq!(bob_rx.try_recv().unwrap(), "hi\n");
        assert!(carol_rx.try_recv().is_err());
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = Registry::new();
        let (b, _b) = session(1, "Bob", 0);
        let (a, _a) = session(2, "Alice", 0);
        registry.insert(b);
        registry.insert(a);
        assert_eq!(registry.names(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_dropping_registry_closes_every_outbox() {
        let mut registry = Registry::new();
        let (alice, mut rx) = session(1, "Alice", 0);
        registry.insert(alice);
        drop(registry);
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }
}
