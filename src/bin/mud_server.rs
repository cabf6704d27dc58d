use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use warren::config::ServerConfig;
use warren::core::wait_for_shutdown;
use warren::database::{self, player_db::CredentialStore, world_db};
use warren::game::Coordinator;
use warren::servers::mud::MudState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut conf_file = "conf/server.yaml".to_string();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("Usage: mud_server [--conf FILE]");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = args[i].clone();
                } else {
                    eprintln!("Error: --conf requires a FILE argument");
                    return Ok(());
                }
            }
            _ => {}
        }
        i += 1;
    }

    let config = ServerConfig::from_file(&conf_file)?;

    let pool = database::connect(&config.database, config.db_max_connections)
        .await
        .with_context(|| format!("Cannot open database: {}", config.database))?;
    database::migrate(&pool)
        .await
        .with_context(|| format!("Cannot migrate database: {}", config.database))?;

    let world = world_db::load_world(&pool)
        .await
        .context("Cannot load world")?;
    let start_room = world
        .find_room(config.start_room)
        .with_context(|| format!("Start room {} does not exist", config.start_room))?;
    let world = Arc::new(world);

    let (events_tx, events_rx) = mpsc::channel(config.event_queue);
    tokio::spawn(Coordinator::new(Arc::clone(&world)).run(events_rx));

    let store = CredentialStore::new(pool.clone(), config.bcrypt_cost);
    let bind = config.bind_addr();
    let state = Arc::new(MudState::new(config, store, start_room, events_tx));

    tracing::info!("[mud] [started] MUD Server Started");

    tokio::select! {
        res = MudState::run(state, &bind) => {
            res.with_context(|| format!("Cannot listen on {}", bind))?;
        }
        sig = wait_for_shutdown() => {
            let sig = sig.context("Cannot install signal handlers")?;
            tracing::info!("[mud] [shutdown] signal={}", sig);
        }
    }

    pool.close().await;
    Ok(())
}
