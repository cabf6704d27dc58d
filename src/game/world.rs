//! The world graph: zones, rooms and exits.
//!
//! Built once by the loader in `database::world_db` (zones, then rooms, then
//! exits) and never mutated afterwards. The coordinator holds it behind an
//! `Arc` and reads it without locking.

use std::collections::HashMap;

use super::types::{Direction, Exit, Exits, Room, RoomId, Zone, ZoneId};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate zone id={0}")]
    DuplicateZone(i64),

    #[error("Duplicate room id={0}")]
    DuplicateRoom(i64),

    #[error("Room id={room} references unknown zone id={zone}")]
    UnknownZone { room: i64, zone: i64 },

    #[error("Exit references unknown room id={0}")]
    UnknownRoom(i64),

    #[error("Exit from room id={room} has invalid direction '{direction}'")]
    BadDirection { room: i64, direction: String },
}

#[derive(Debug, Default)]
pub struct World {
    zones: Vec<Zone>,
    rooms: Vec<Room>,
    zone_index: HashMap<i64, ZoneId>,
    room_index: HashMap<i64, RoomId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&mut self, id: i64, name: impl Into<String>) -> Result<ZoneId, WorldError> {
        if self.zone_index.contains_key(&id) {
            return Err(WorldError::DuplicateZone(id));
        }
        let zid = ZoneId(self.zones.len());
        self.zones.push(Zone { id, name: name.into(), rooms: Vec::new() });
        self.zone_index.insert(id, zid);
        Ok(zid)
    }

    /// Adds a room with no exits to an already-loaded zone.
    pub fn add_room(
        &mut self,
        id: i64,
        zone_id: i64,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<RoomId, WorldError> {
        let zone = *self
            .zone_index
            .get(&zone_id)
            .ok_or(WorldError::UnknownZone { room: id, zone: zone_id })?;
        if self.room_index.contains_key(&id) {
            return Err(WorldError::DuplicateRoom(id));
        }
        let rid = RoomId(self.rooms.len());
        self.rooms.push(Room {
            id,
            zone,
            name: name.into(),
            description: description.into(),
            exits: Exits::default(),
        });
        self.room_index.insert(id, rid);
        self.zones[zone.0].rooms.push(rid);
        Ok(rid)
    }

    /// Wires an exit between two already-loaded rooms.
    pub fn set_exit(
        &mut self,
        from: i64,
        dir: Direction,
        to: i64,
        description: impl Into<String>,
    ) -> Result<(), WorldError> {
        let from_id = self.find_room(from).ok_or(WorldError::UnknownRoom(from))?;
        let to_id = self.find_room(to).ok_or(WorldError::UnknownRoom(to))?;
        self.rooms[from_id.0].exits.set(
            dir,
            Exit { to: Some(to_id), description: description.into() },
        );
        Ok(())
    }

    /// Resolves a persistent room id (e.g. the configured start room).
    pub fn find_room(&self, id: i64) -> Option<RoomId> {
        self.room_index.get(&id).copied()
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.0]
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.0]
    }

    /// Zone a room belongs to.
    pub fn zone_of(&self, id: RoomId) -> ZoneId {
        self.room(id).zone
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Destination reached by leaving `from` towards `dir`, if the exit is open.
    pub fn follow(&self, from: RoomId, dir: Direction) -> Option<RoomId> {
        self.room(from).exits.get(dir).target()
    }

    /// `[ Exits: n e ]` summary line.
    pub fn exits_line(&self, id: RoomId) -> String {
        let mut line = String::from("[ Exits:");
        let mut any = false;
        for dir in self.room(id).exits.open() {
            line.push(' ');
            line.push_str(dir.code());
            any = true;
        }
        if !any {
            line.push_str(" none");
        }
        line.push_str(" ]");
        line
    }
}
