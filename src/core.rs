//! Process lifecycle: waiting for the signal that stops the server.

use std::fmt;

/// Signals the server listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM (graceful shutdown)
    Terminate,
    /// SIGHUP (terminal went away; logged and ignored)
    Hangup,
}

impl Signal {
    /// Check if this signal should trigger shutdown
    pub fn should_shutdown(&self) -> bool {
        matches!(self, Signal::Interrupt | Signal::Terminate)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Hangup => "SIGHUP",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves on the first signal that should stop the server.
#[cfg(unix)]
pub async fn wait_for_shutdown() -> std::io::Result<Signal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        let sig = tokio::select! {
            _ = interrupt.recv() => Signal::Interrupt,
            _ = terminate.recv() => Signal::Terminate,
            _ = hangup.recv() => Signal::Hangup,
        };
        if sig.should_shutdown() {
            return Ok(sig);
        }
        tracing::info!("[core] [signal_ignored] signal={}", sig);
    }
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await?;
    Ok(Signal::Interrupt)
}
