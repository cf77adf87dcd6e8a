pub mod audit;
pub mod exclusions;
pub mod legacy;
pub mod pipeline;
pub mod store;

use crate::telemetry::logging;
use crate::treasure::exclusions::ExclusionTable;
use crate::treasure::pipeline::{CandidatePipeline, PipelineReport, PipelineSettings};
use crate::treasure::store::CandidateStore;
use crate::world::query::WorldQuery;
use crate::world::rng::WorldRng;
use crate::world::spawners::SpawnerSnapshot;
use crate::world::tiles::BadTileRegistry;
use std::path::PathBuf;
use std::sync::{Mutex, TryLockError};

static GENERATION: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    AlreadyRunning,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::AlreadyRunning => write!(f, "treasure generation is already running"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Where generation reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasureFiles {
    pub candidates: PathBuf,
    pub legacy: PathBuf,
    pub bad_tile_audit: PathBuf,
    pub region_audit: PathBuf,
}

/// Everything a generation run consults.
pub struct TreasureSources<'a, W: WorldQuery> {
    pub world: &'a W,
    pub spawners: &'a SpawnerSnapshot,
    pub exclusions: &'a ExclusionTable,
    pub bad_tiles: &'a BadTileRegistry,
    pub settings: PipelineSettings,
    pub files: &'a TreasureFiles,
}

/// Runs the pipeline, merges the legacy list, and persists the result.
/// Only one run may be in progress per process. Write failures are logged
/// and the in-memory list is still returned.
pub fn generate_locations<W: WorldQuery>(
    sources: &TreasureSources<'_, W>,
    rng: &mut WorldRng,
    progress: &mut dyn FnMut(&str),
) -> Result<(CandidateStore, PipelineReport), PipelineError> {
    let _guard = match GENERATION.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => return Err(PipelineError::AlreadyRunning),
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
    };

    progress("generating treasure locations");
    let mut pipeline = CandidatePipeline::new(
        sources.world,
        sources.spawners,
        sources.exclusions,
        sources.bad_tiles,
        sources.settings.clone(),
    );
    let (accepted, report) = pipeline.run(rng, progress);

    let mut store = CandidateStore::default();
    store.union(accepted.iter().map(|point| point.xy()));
    let generated = store.len();
    let added = store.union(legacy::load_legacy(&sources.files.legacy));
    progress(&format!(
        "{} generated locations, {} added from the legacy list",
        generated, added
    ));

    if let Err(err) = store.save(&sources.files.candidates) {
        logging::log_error(&err.to_string());
        progress(&format!("saving failed: {}", err));
    }
    if let Err(err) = audit::write_bad_tile_audit(&sources.files.bad_tile_audit, &report.bad_tiles) {
        logging::log_error(&format!(
            "bad tile audit {} failed: {}",
            sources.files.bad_tile_audit.display(),
            err
        ));
    }
    if let Err(err) =
        audit::write_region_audit(&sources.files.region_audit, sources.world, store.locations())
    {
        logging::log_error(&format!(
            "region audit {} failed: {}",
            sources.files.region_audit.display(),
            err
        ));
    }

    for line in report.summary_lines() {
        progress(&line);
    }
    progress(&format!("{} treasure locations stored", store.len()));
    Ok((store, report))
}

/// The stored list when present and readable, a fresh run otherwise.
/// Never fails; the worst case is an empty list.
pub fn load_or_generate<W: WorldQuery>(
    sources: &TreasureSources<'_, W>,
    rng: &mut WorldRng,
    regenerate: bool,
) -> CandidateStore {
    if !regenerate {
        match CandidateStore::load(&sources.files.candidates) {
            Ok(Some(store)) => {
                logging::log_game(&format!("loaded {} treasure locations", store.len()));
                return store;
            }
            Ok(None) => logging::log_game("no treasure location file, generating"),
            Err(err) => logging::log_error(&format!("{}; regenerating", err)),
        }
    }
    let mut progress = |message: &str| logging::log_game(message);
    match generate_locations(sources, rng, &mut progress) {
        Ok((store, _)) => store,
        Err(err) => {
            logging::log_error(&err.to_string());
            CandidateStore::default()
        }
    }
}
