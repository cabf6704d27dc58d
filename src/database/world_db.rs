//! World graph loader.
//!
//! Loading is strictly ordered: zones, then rooms (which reference zones),
//! then exits (which reference rooms). Any inconsistency is an error; the
//! server refuses to start on a half-loaded world.

use sqlx::SqlitePool;

use crate::game::types::Direction;
use crate::game::world::{World, WorldError};

/// Read every zone. Returns a world with no rooms yet.
pub async fn load_zones(pool: &SqlitePool) -> Result<World, WorldError> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM zones ORDER BY id")
        .fetch_all(pool)
        .await?;

    let mut world = World::new();
    for (id, name) in rows {
        world.add_zone(id, name)?;
    }
    Ok(world)
}

/// Read every room into zones already present in `world`.
pub async fn load_rooms(pool: &SqlitePool, world: &mut World) -> Result<usize, WorldError> {
    let rows: Vec<(i64, i64, String, String)> =
        sqlx::query_as("SELECT id, zone_id, name, description FROM rooms ORDER BY id")
            .fetch_all(pool)
            .await?;

    let count = rows.len();
    for (id, zone_id, name, description) in rows {
        world.add_room(id, zone_id, name, description)?;
    }
    Ok(count)
}

/// Wire exits between rooms already present in `world`.
pub async fn load_exits(pool: &SqlitePool, world: &mut World) -> Result<usize, WorldError> {
    let rows: Vec<(i64, i64, String, String)> = sqlx::query_as(
        "SELECT from_room_id, to_room_id, direction, description FROM exits ORDER BY from_room_id",
    )
    .fetch_all(pool)
    .await?;

    let count = rows.len();
    for (from, to, direction, description) in rows {
        let dir = Direction::parse(&direction)
            .ok_or(WorldError::BadDirection { room: from, direction })?;
        world.set_exit(from, dir, to, description)?;
    }
    Ok(count)
}

/// Full load in dependency order.
pub async fn load_world(pool: &SqlitePool) -> Result<World, WorldError> {
    let mut world = load_zones(pool).await?;
    let rooms = load_rooms(pool, &mut world).await?;
    let exits = load_exits(pool, &mut world).await?;
    tracing::info!(
        "[db] [world_loaded] zones={} rooms={} exits={}",
        world.zone_count(),
        rooms,
        exits
    );
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;

    async fn seed(pool: &SqlitePool) {
        for sql in [
            "INSERT INTO zones (id, name) VALUES (30, 'Midgaard'), (40, 'Forest')",
            "INSERT INTO rooms (id, zone_id, name, description) VALUES
                (3001, 30, 'Temple', 'You are in the temple.'),
                (3002, 30, 'Square', 'The market square.'),
                (4001, 40, 'Path', 'A winding path.')",
            "INSERT INTO exits (from_room_id, to_room_id, direction, description) VALUES
                (3001, 3002, 's', 'The square lies south.'),
                (3002, 3001, 'n', 'The temple.'),
                (3002, 4001, 'e', 'A path east.')",
        ] {
            sqlx::query(sql).execute(pool).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_load_world() {
        let pool = memory_pool().await;
        seed(&pool).await;

        let world = load_world(&pool).await.unwrap();
        assert_eq!(world.zone_count(), 2);
        assert_eq!(world.room_count(), 3);

        let temple = world.find_room(3001).unwrap();
        let square = world.find_room(3002).unwrap();
        let path = world.find_room(4001).unwrap();
        assert_eq!(world.follow(temple, Direction::South), Some(square));
        assert_eq!(world.follow(square, Direction::East), Some(path));
        assert_eq!(world.follow(square, Direction::West), None);
        assert_eq!(world.zone(world.zone_of(path)).name, "Forest");
    }

    #[tokio::test]
    async fn test_load_empty_world() {
        let pool = memory_pool().await;
        let world = load_world(&pool).await.unwrap();
        assert_eq!(world.room_count(), 0);
        assert!(world.find_room(3001).is_none());
    }

    #[tokio::test]
    async fn test_room_with_missing_zone_fails() {
        let pool = memory_pool().await;
        // foreign keys are on; bypass them to simulate a damaged file
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO rooms (id, zone_id, name) VALUES (1, 99, 'Orphan')")
            .execute(&pool)
            .await
            .unwrap();

        let err = load_world(&pool).await.unwrap_err();
        assert!(matches!(err, WorldError::UnknownZone { room: 1, zone: 99 }));
    }
}
