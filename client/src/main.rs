mod assets;
mod console;
mod game;
mod input;
mod player;
mod session;
mod storage;
mod transport;
mod world;

use std::time::{Duration, Instant};

use log::{debug, error, info};
use shared::{GameConfig, PHYSICS_DT};

use crate::assets::ManifestSource;
use crate::game::{Game, GameError};
use crate::storage::JsonFileStore;
use crate::transport::WsTransport;
use crate::world::default_level;

const DEFAULT_RELAY_URL: &str = "ws://localhost:3000";
const PREFS_FILE: &str = "platformer-prefs.json";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("fatal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GameError> {
    let url = read_url_from_cli_env().unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
    info!("connecting to relay at {url}");

    let transport = WsTransport::connect(&url)?;
    let mut store = JsonFileStore::open(PREFS_FILE)?;
    let models = ManifestSource::with_player_model();
    let level = default_level();

    let config = GameConfig::default();
    let mut game = Game::new(config, transport, &store, &models, &level)?;
    info!("joined as {}", game.session.user.name);
    if config.show_body_helpers {
        let bodies = &game.world.bodies;
        for object in bodies.ground.iter().chain(&bodies.blocks) {
            if let Some(outline) = &object.debug {
                debug!(
                    "collider at {:?}, half extents {:?}",
                    object.model.translation, outline.half_extents
                );
            }
        }
    }

    let commands = console::spawn_reader();

    // Fixed-cadence loop. Delta is measured, not assumed, so a slow tick
    // still advances the simulation by the right amount.
    let frame = Duration::from_secs_f32(PHYSICS_DT);
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let delta = (now - last).as_secs_f32();
        last = now;

        while let Ok(command) = commands.try_recv() {
            if !console::apply(&mut game, &mut store, command) {
                info!("session closed from the console");
                return Ok(());
            }
        }

        game.tick(delta, now);

        let elapsed = last.elapsed();
        if elapsed < frame {
            std::thread::sleep(frame - elapsed);
        }
    }
}

/// Relay URL from `--url <URL>` / `--url=<URL>` or the `RELAY_URL`
/// environment variable, CLI taking precedence.
fn read_url_from_cli_env() -> Option<String> {
    let mut args = std::env::args().skip(1);
    let mut pending = false;

    while let Some(arg) = args.next() {
        if pending {
            return Some(arg);
        } else if arg == "--url" || arg == "-u" {
            pending = true;
        } else if let Some(val) = arg.strip_prefix("--url=") {
            return Some(val.to_string());
        }
    }

    std::env::var("RELAY_URL").ok().filter(|v| !v.is_empty())
}
