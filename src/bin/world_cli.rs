use anyhow::{bail, Context, Result};
use warren::database::{self, world_db};
use warren::game::types::Direction;
use warren::game::World;

const USAGE: &str = "Usage: world_cli --db FILE <init|dump>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut db_file: Option<String> = None;
    let mut command: Option<String> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("{}", USAGE);
                return Ok(());
            }
            "--db" => {
                if i + 1 < args.len() {
                    i += 1;
                    db_file = Some(args[i].clone());
                } else {
                    bail!("--db requires a FILE argument");
                }
            }
            other => command = Some(other.to_string()),
        }
        i += 1;
    }

    let Some(db_file) = db_file else {
        bail!("{}", USAGE);
    };

    let pool = database::connect(&db_file, 1)
        .await
        .with_context(|| format!("Cannot open database: {}", db_file))?;

    match command.as_deref() {
        Some("init") => {
            database::migrate(&pool)
                .await
                .with_context(|| format!("Cannot migrate database: {}", db_file))?;
            println!("Schema ready: {}", db_file);
        }
        Some("dump") => {
            let world = world_db::load_world(&pool).await.context("Cannot load world")?;
            print!("{}", dump(&world));
        }
        _ => bail!("{}", USAGE),
    }

    pool.close().await;
    Ok(())
}

fn dump(world: &World) -> String {
    let mut out = String::new();
    for zone in world.zones() {
        out.push_str(&format!("Zone {} {} ({} rooms)\n", zone.id, zone.name, zone.rooms.len()));
        for &room_id in &zone.rooms {
            let room = world.room(room_id);
            let exits: Vec<String> = Direction::ALL
                .into_iter()
                .filter_map(|dir| {
                    let to = room.exits.get(dir).target()?;
                    Some(format!("{}->{}", dir.code(), world.room(to).id))
                })
                .collect();
            out.push_str(&format!("  [{}] {}", room.id, room.name));
            if !exits.is_empty() {
                out.push_str(&format!("  exits: {}", exits.join(" ")));
            }
            out.push('\n');
        }
    }
    out
}
