pub mod auth;
pub mod client;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

use crate::config::ServerConfig;
use crate::database::player_db::CredentialStore;
use crate::game::types::RoomId;
use crate::game::{CloseReason, Event, Session, SessionId};
use crate::network::{write_text, SharedWriter};
use auth::{authenticate, AuthError, AuthPolicy};

/// Everything a connection task needs. Shared read-only across tasks; the
/// mutable world state lives behind `events` in the coordinator.
pub struct MudState {
    pub config: ServerConfig,
    pub store: CredentialStore,
    pub start_room: RoomId,
    pub events: mpsc::Sender<Event>,
    next_session: AtomicU64,
}

impl MudState {
    pub fn new(
        config: ServerConfig,
        store: CredentialStore,
        start_room: RoomId,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            config,
            store,
            start_room,
            events,
            next_session: AtomicU64::new(1),
        }
    }

    pub fn next_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn run(state: Arc<Self>, bind_addr: &str) -> Result<()> {
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("[mud] [ready] addr={}", bind_addr);
        Self::serve(state, listener).await;
        Ok(())
    }

    /// Accept loop. Never returns; accept errors are logged and skipped.
    pub async fn serve(state: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let s = Arc::clone(&state);
                    tokio::spawn(async move {
                        handle_new_connection(s, stream, peer).await;
                    });
                }
                Err(e) => {
                    tracing::warn!("[mud] [accept_error] error={}", e);
                    // fd exhaustion would otherwise spin
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

pub async fn handle_new_connection(state: Arc<MudState>, stream: TcpStream, peer: SocketAddr) {
    let session = state.next_session_id();
    tracing::info!("[mud] [connect] peer={} session={}", peer, session);

    let (read_half, mut write_half) = stream.into_split();
    let mut input = BufReader::new(read_half);

    if write_text(&mut write_half, &format!("{}\n", state.config.banner))
        .await
        .is_err()
    {
        return;
    }

    let policy = AuthPolicy::from_config(&state.config);
    let name = match authenticate(&mut input, &mut write_half, &state.store, policy).await {
        Ok(name) => name,
        Err(AuthError::Disconnected) => {
            tracing::info!("[mud] [auth_abandoned] peer={} session={}", peer, session);
            return;
        }
        Err(e) => {
            tracing::warn!("[mud] [auth_failed] peer={} session={} error={}", peer, session, e);
            let _ = write_half.shutdown().await;
            return;
        }
    };
    tracing::info!("[mud] [authenticated] name={} peer={} session={}", name, peer, session);

    let welcome = format!("Welcome {}! Enter a command or type 'quit' to quit\n", name);
    if write_text(&mut write_half, &welcome).await.is_err() {
        return;
    }

    let (outbox, inbox) = mpsc::unbounded_channel();
    let writer: SharedWriter = Arc::new(Mutex::new(write_half));
    let mut writer_task = tokio::spawn(client::run_writer(Arc::clone(&writer), inbox));

    let login = Event::Login(Session::new(session, name.clone(), state.start_room, outbox));
    if state.events.send(login).await.is_err() {
        tracing::warn!("[mud] [coordinator_gone] name={} session={}", name, session);
        return;
    }

    let reader = client::run_reader(input, writer, state.events.clone(), session, name.clone());
    tokio::select! {
        _ = reader => {
            // the coordinator closes the outbox once it handles our Close
            let _ = writer_task.await;
        }
        _ = &mut writer_task => {
            // write failure or retirement; a stale close is ignored
            let _ = state
                .events
                .send(Event::Close {
                    session,
                    name: name.clone(),
                    reason: CloseReason::Disconnected,
                })
                .await;
        }
    }

    tracing::info!("[mud] [disconnect] name={} peer={} session={}", name, peer, session);
}
