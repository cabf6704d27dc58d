//! Network front ends.
//!
//! - mud: the line-based game server (login gate, then one reader and one
//!   writer task per player)

pub mod mud;
