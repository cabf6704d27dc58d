//! Shared world-graph types.
//!
//! Rooms and zones live in arenas owned by [`crate::game::world::World`];
//! cross references between them are plain indices (`RoomId`, `ZoneId`)
//! so the graph has no cycles and can be shared read-only across tasks.

use std::fmt;

/// Index of a zone inside `World::zones`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId(pub(crate) usize);

/// Index of a room inside `World::rooms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub(crate) usize);

/// The six fixed exit directions, in exit-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    West,
    South,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::Up,
        Direction::Down,
    ];

    /// Slot in a room's exit table.
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::West => 2,
            Direction::South => 3,
            Direction::Up => 4,
            Direction::Down => 5,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Lower-case full name (`north`).
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::West => "west",
            Direction::South => "south",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Single-letter code, as stored in the `exits.direction` column.
    pub fn code(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::East => "e",
            Direction::West => "w",
            Direction::South => "s",
            Direction::Up => "u",
            Direction::Down => "d",
        }
    }

    /// Accepts either the full name or the single-letter code, any case.
    pub fn parse(s: &str) -> Option<Direction> {
        let s = s.to_ascii_lowercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.name() == s || d.code() == s)
    }

    /// Text used when announcing a departure: "went North".
    pub fn departure(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::West => "West",
            Direction::South => "South",
            Direction::Up => "Up",
            Direction::Down => "Down",
        }
    }

    /// Text used when announcing an arrival after moving in `self`:
    /// someone who went north "came from the South".
    pub fn arrival(self) -> &'static str {
        match self {
            Direction::Up => "below",
            Direction::Down => "above",
            dir => match dir.opposite() {
                Direction::North => "the North",
                Direction::East => "the East",
                Direction::West => "the West",
                _ => "the South",
            },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One directional exit. An empty description means "no exit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exit {
    pub to: Option<RoomId>,
    pub description: String,
}

impl Exit {
    pub fn is_open(&self) -> bool {
        !self.description.is_empty()
    }

    /// Destination of a usable exit.
    pub fn target(&self) -> Option<RoomId> {
        if self.is_open() { self.to } else { None }
    }
}

/// Exactly six exit slots, addressed by [`Direction`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exits([Exit; 6]);

impl Exits {
    pub fn get(&self, dir: Direction) -> &Exit {
        &self.0[dir.index()]
    }

    pub fn set(&mut self, dir: Direction, exit: Exit) {
        self.0[dir.index()] = exit;
    }

    /// Directions with an open exit, in slot order.
    pub fn open(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.get(*d).is_open())
    }
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub rooms: Vec<RoomId>,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: i64,
    pub zone: ZoneId,
    pub name: String,
    pub description: String,
    pub exits: Exits,
}
