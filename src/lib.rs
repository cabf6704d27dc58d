//! Warren - text MUD server
//!
//! Players connect over plain TCP, log in, and move through a world of zones
//! and rooms loaded from SQLite. A single coordinator task owns all mutable
//! game state; connection tasks talk to it through a channel.

/// Server configuration
pub mod config;
/// Process lifecycle and shutdown signals
pub mod core;
/// Database modules (world graph, player credentials)
pub mod database;
/// World model, command table and coordinator
pub mod game;
/// Line I/O helpers
pub mod network;
/// Server implementations
pub mod servers;
