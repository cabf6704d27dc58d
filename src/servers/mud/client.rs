//! The two halves of a logged-in connection.
//!
//! The reader turns input lines into coordinator events. The writer drains
//! the session's outbox onto the socket; the outbox closing is its only stop
//! signal, after which it shuts the socket's write side down.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

use crate::game::{CloseReason, Event, SessionId};
use crate::network::{read_line, tokens, write_text};

pub const EMPTY_LINE_PROMPT: &str = "Please enter a command\n";

/// Reads commands until quit, EOF or a read error (an over-long line is one),
/// then reports exactly one close to the coordinator. `prompt` is only used
/// to answer empty lines.
pub async fn run_reader<R, W>(
    mut input: R,
    prompt: Arc<Mutex<W>>,
    events: mpsc::Sender<Event>,
    session: SessionId,
    name: String,
) where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let reason = loop {
        let line = match read_line(&mut input).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("[mud] [eof] name={} session={}", name, session);
                break CloseReason::Disconnected;
            }
            Err(e) => {
                tracing::warn!("[mud] [read_error] name={} session={} error={}", name, session, e);
                break CloseReason::Disconnected;
            }
        };

        let tokens = tokens(&line);
        let Some(first) = tokens.first() else {
            // shared with the writer, so a client that stops reading stalls this too
            let mut w = prompt.lock().await;
            if write_text(&mut *w, EMPTY_LINE_PROMPT).await.is_err() {
                break CloseReason::Disconnected;
            }
            continue;
        };

        if first.eq_ignore_ascii_case("quit") {
            break CloseReason::Quit;
        }

        let event = Event::Command {
            session,
            name: name.clone(),
            tokens,
        };
        if events.send(event).await.is_err() {
            // coordinator is gone; nobody to tell
            return;
        }
    };

    let _ = events
        .send(Event::Close {
            session,
            name,
            reason,
        })
        .await;
}

/// Writes each queued message verbatim until the outbox closes or a write
/// fails.
pub async fn run_writer<W>(writer: Arc<Mutex<W>>, mut outbox: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = outbox.recv().await {
        let mut w = writer.lock().await;
        if let Err(e) = write_text(&mut *w, &text).await {
            tracing::debug!("[mud] [write_error] error={}", e);
            return;
        }
    }
    let _ = writer.lock().await.shutdown().await;
}
