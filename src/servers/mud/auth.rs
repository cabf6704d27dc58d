//! Login handshake: username, then password check or account creation.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::config::ServerConfig;
use crate::database::player_db::{CredentialStore, StoreError};
use crate::network::{read_line, write_text};

pub const USERNAME_PROMPT: &str = "Username: ";
pub const PASSWORD_PROMPT: &str = "Password: ";
pub const INVALID_NAME: &str = "Invalid name, use 3 to 12 letters.\n";
pub const EMPTY_PASSWORD: &str = "Password cannot be empty.\n";
pub const WRONG_PASSWORD: &str = "Password Incorrect, try again.\n";
pub const TOO_MANY_ATTEMPTS: &str = "Too many failed attempts.\n";
pub const NAME_TAKEN: &str = "That name was just taken.\n";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Connection closed during login")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Too many failed attempts")]
    TooManyAttempts,

    #[error("Login timed out")]
    TimedOut,
}

/// Limits applied to a single handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl AuthPolicy {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_attempts: config.auth_attempt_limit(),
            timeout: config.auth_timeout(),
        }
    }
}

pub fn is_valid_name(s: &str) -> bool {
    s.len() >= 3 && s.len() <= 12 && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Runs the handshake under the policy's timeout. Returns the player name.
pub async fn authenticate<R, W>(
    input: &mut R,
    writer: &mut W,
    store: &CredentialStore,
    policy: AuthPolicy,
) -> Result<String, AuthError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let handshake = login(input, writer, store, policy.max_attempts);
    match policy.timeout {
        Some(limit) => tokio::time::timeout(limit, handshake)
            .await
            .map_err(|_| AuthError::TimedOut)?,
        None => handshake.await,
    }
}

async fn login<R, W>(
    input: &mut R,
    writer: &mut W,
    store: &CredentialStore,
    max_attempts: Option<u32>,
) -> Result<String, AuthError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let name = read_name(input, writer).await?;

    if store.exists(&name).await? {
        check_password(input, writer, store, &name, max_attempts).await?;
    } else {
        write_text(writer, &format!("Creating new user: {}\n", name)).await?;
        let password = loop {
            let password = prompt(input, writer, PASSWORD_PROMPT).await?;
            if !password.is_empty() {
                break password;
            }
            write_text(writer, EMPTY_PASSWORD).await?;
        };
        match store.create(&name, &password).await {
            Ok(()) => {}
            // another connection registered the name after our lookup
            Err(StoreError::AlreadyExists(_)) => {
                tracing::info!("[auth] [name_taken] name={}", name);
                if !store.verify(&name, &password).await? {
                    write_text(writer, NAME_TAKEN).await?;
                    check_password(input, writer, store, &name, max_attempts).await?;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    store.touch_login(&name).await?;
    Ok(name)
}

/// Prompts until the password matches `name`'s stored hash.
async fn check_password<R, W>(
    input: &mut R,
    writer: &mut W,
    store: &CredentialStore,
    name: &str,
    max_attempts: Option<u32>,
) -> Result<(), AuthError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut failures = 0u32;
    loop {
        let password = prompt(input, writer, PASSWORD_PROMPT).await?;
        if store.verify(name, &password).await? {
            return Ok(());
        }
        failures += 1;
        tracing::info!("[auth] [wrong_password] name={} failures={}", name, failures);
        if max_attempts.is_some_and(|limit| failures >= limit) {
            write_text(writer, TOO_MANY_ATTEMPTS).await?;
            return Err(AuthError::TooManyAttempts);
        }
        write_text(writer, WRONG_PASSWORD).await?;
    }
}

async fn read_name<R, W>(input: &mut R, writer: &mut W) -> Result<String, AuthError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = prompt(input, writer, USERNAME_PROMPT).await?;
        let name = line.trim();
        if is_valid_name(name) {
            return Ok(name.to_string());
        }
        write_text(writer, INVALID_NAME).await?;
    }
}

async fn prompt<R, W>(input: &mut R, writer: &mut W, text: &str) -> Result<String, AuthError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_text(writer, text).await?;
    read_line(input).await?.ok_or(AuthError::Disconnected)
}
