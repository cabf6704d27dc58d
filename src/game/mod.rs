//! World model and the coordinator that owns all mutable game state.

pub mod commands;
pub mod coordinator;
pub mod registry;
pub mod session;
pub mod types;
pub mod world;

pub use coordinator::{CloseReason, Coordinator, Event};
pub use session::{Session, SessionId};
pub use world::{World, WorldError};
