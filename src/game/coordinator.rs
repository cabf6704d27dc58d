//! World coordinator: the single task that owns the registry.
//!
//! Connection tasks never touch shared state; they send an [`Event`] and the
//! coordinator applies events one at a time, in the order received. Every
//! broadcast a command produces is queued before the next event is read.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::commands::{room_view, CommandTable};
use super::registry::Registry;
use super::session::{Session, SessionId};
use super::world::World;

/// Why a connection is going away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The player typed `quit`.
    Quit,
    /// EOF or a read error on the socket.
    Disconnected,
}

#[derive(Debug)]
pub enum Event {
    /// An authenticated connection joining the world.
    Login(Session),
    /// One whitespace-split input line.
    Command {
        session: SessionId,
        name: String,
        tokens: Vec<String>,
    },
    Close {
        session: SessionId,
        name: String,
        reason: CloseReason,
    },
}

pub struct Coordinator {
    world: Arc<World>,
    registry: Registry,
    commands: CommandTable,
}

impl Coordinator {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            registry: Registry::new(),
            commands: CommandTable::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Consumes events until every sender is gone and hands back the final
    /// registry. Dropping it closes every remaining outbox.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) -> Registry {
        tracing::info!("[world] [coordinator_started] rooms={}", self.world.room_count());
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::info!("[world] [coordinator_stopped] online={}", self.registry.len());
        self.registry
    }

    /// Applies one event. Never fails: bad input becomes a reply, and
    /// events from retired sessions are dropped.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Login(session) => self.login(session),
            Event::Command { session, name, tokens } => {
                if !self.registry.is_current(&name, session) {
                    tracing::debug!("[world] [stale_command] name={} session={}", name, session);
                    return;
                }
                self.commands.execute(&self.world, &mut self.registry, &name, &tokens);
            }
            Event::Close { session, name, reason } => self.close(session, &name, reason),
        }
    }

    fn login(&mut self, session: Session) {
        // last login wins: the old outbox is closed before the new one goes in
        if let Some(old) = self.registry.take(&session.name) {
            tracing::info!(
                "[world] [duplicate_login] name={} retired={} new={}",
                old.name, old.id, session.id
            );
            old.send("You have been logged in from elsewhere.\n");
            drop(old);
        }

        tracing::info!("[world] [login] name={} session={}", session.name, session.id);
        let room = session.room;
        let name = session.name.clone();
        self.registry.insert(session);
        if let Some(session) = self.registry.get(&name) {
            session.send(room_view(&self.world, &self.registry, room));
        }
    }

    fn close(&mut self, id: SessionId, name: &str, reason: CloseReason) {
        let Some(session) = self.registry.remove(name, id) else {
            tracing::debug!("[world] [stale_close] name={} session={}", name, id);
            return;
        };
        if reason == CloseReason::Quit {
            session.send("Goodbye.\n");
        }
        tracing::info!("[world] [logout] name={} session={} reason={:?}", name, id, reason);
        // dropping the session drops the only sender; the writer sees the close
    }
}
