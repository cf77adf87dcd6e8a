pub mod admin;
pub mod cartography;
mod config;
pub mod net;
pub mod telemetry;
pub mod treasure;
pub mod world;

pub use cartography::editing::{MapHandle, MAX_USER_PINS};
pub use cartography::map_item::{CoordinateError, MapItem, PinEdit};
pub use cartography::treasure_map::TreasureMap;
pub use net::map_commands::{CommandKind, DecodeError, MapCommand, MapDisplay};
pub use net::packet::{PacketReader, PacketWriter};
pub use treasure::store::{CandidateStore, SelectOutcome};
pub use treasure::{generate_locations, load_or_generate, PipelineError, TreasureFiles, TreasureSources};

use admin::commands::{execute_admin_command, parse_admin_command, AdminContext};
use world::grid::GridWorld;
use world::rng::WorldRng;
use world::spawners::{load_spawners, SpawnerSnapshot};

pub fn run(args: &[String]) -> Result<(), String> {
    let config = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&config.root)?;
    let treasure_config = config::TreasureConfig::load(&config.root)?;

    let world_path = config.root.join(&treasure_config.world_file);
    let world = GridWorld::load(&world_path).map_err(|err| err.to_string())?;
    let spawner_path = config.root.join(&treasure_config.spawner_file);
    let spawners = match load_spawners(&spawner_path) {
        Ok(spawners) => spawners,
        Err(err) => {
            telemetry::logging::log_error(&format!("spawners unavailable: {}", err));
            eprintln!("treasure_maps: {}", err);
            Vec::new()
        }
    };
    let spawners = SpawnerSnapshot::new(spawners);
    let exclusions = treasure_config.exclusion_table();
    let bad_tiles = treasure_config.bad_tile_registry();
    let files = treasure_config.files(&config.root);
    let mut rng = match config.seed {
        Some(seed) => WorldRng::from_seed(seed),
        None => WorldRng::from_time(),
    };

    let (width, height) = world::query::WorldQuery::size(&world);
    telemetry::logging::log_game(&format!(
        "world {}x{}, {} regions, {} spawners",
        width,
        height,
        world.region_count(),
        spawners.len()
    ));
    println!("treasure_maps: startup");
    println!("- root: {}", config.root.display());
    println!("- world: {}x{}, regions={}", width, height, world.region_count());
    println!("- spawners: {}", spawners.len());

    let sources = TreasureSources {
        world: &world,
        spawners: &spawners,
        exclusions: &exclusions,
        bad_tiles: &bad_tiles,
        settings: treasure_config.pipeline_settings(),
        files: &files,
    };
    let store = load_or_generate(&sources, &mut rng, config.regenerate);
    println!("- treasure locations: {}", store.len());

    let Some(message) = config.command.as_deref() else {
        return Ok(());
    };
    let command = parse_admin_command(message)?
        .ok_or_else(|| format!("not an admin command: '{}'", message))?;
    let mut context = AdminContext {
        sources,
        store,
        rng,
        selection_attempts: treasure_config.selection_attempts,
        world_size: treasure_config.world_size(),
    };
    for line in execute_admin_command(&command, &mut context) {
        println!("{}", line);
    }
    Ok(())
}
