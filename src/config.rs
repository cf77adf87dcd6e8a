use crate::cartography::map_item::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH};
use crate::treasure::exclusions::ExclusionTable;
use crate::treasure::pipeline::PipelineSettings;
use crate::treasure::store::SELECTION_ATTEMPTS;
use crate::treasure::TreasureFiles;
use crate::world::tiles::{BadTileRegistry, TileRange};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TREASURE_CONFIG_FILE: &str = "treasure.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub root: PathBuf,
    /// Admin command to run after startup, e.g. `!treasurecount`.
    pub command: Option<String>,
    pub seed: Option<u64>,
    pub regenerate: bool,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        Self::from_args_with_env(args, |key| std::env::var(key).ok())
    }

    pub fn from_args_with_env<F>(args: &[String], env: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if args.len() < 2 {
            return Err("usage: treasure_maps <data-root> [admin command...]".to_string());
        }

        let root = Path::new(&args[1]).to_path_buf();
        let command = if args.len() > 2 {
            Some(args[2..].join(" "))
        } else {
            None
        };
        let seed = match non_empty(env("TREASURE_SEED")) {
            Some(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|_| format!("TREASURE_SEED expected u64, got '{value}'"))?,
            ),
            None => None,
        };
        let regenerate = non_empty(env("TREASURE_REGENERATE"))
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self {
            root,
            command,
            seed,
            regenerate,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Tunables read from `<root>/treasure.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreasureConfig {
    pub world_width: i32,
    pub world_height: i32,
    pub fan_out_attempts: u32,
    pub fan_out_range: i32,
    pub reachability_radius: i32,
    pub path_node_budget: u64,
    /// Per-candidate pathing allowance; `null` disables the clock.
    pub path_time_budget_ms: Option<u64>,
    pub region_cache_size: usize,
    pub selection_attempts: u32,
    pub world_file: String,
    pub spawner_file: String,
    pub candidates_file: String,
    pub legacy_file: String,
    pub bad_tile_audit_file: String,
    pub region_audit_file: String,
    /// Replaces the built-in bad tile list when present.
    pub bad_tiles: Option<Vec<TileRange>>,
    /// Replaces the built-in exclusion rules when present.
    pub exclusions: Option<ExclusionTable>,
}

impl Default for TreasureConfig {
    fn default() -> Self {
        let pipeline = PipelineSettings::default();
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            fan_out_attempts: pipeline.fan_out_attempts,
            fan_out_range: pipeline.fan_out_range,
            reachability_radius: pipeline.reachability_radius,
            path_node_budget: pipeline.path_node_budget,
            path_time_budget_ms: pipeline
                .path_time_budget
                .map(|budget| budget.as_millis() as u64),
            region_cache_size: pipeline.region_cache_size,
            selection_attempts: SELECTION_ATTEMPTS,
            world_file: "world.yaml".to_string(),
            spawner_file: "spawners.db".to_string(),
            candidates_file: "treasure.bin".to_string(),
            legacy_file: "treasure_legacy.txt".to_string(),
            bad_tile_audit_file: "log/treasure_badtiles.log".to_string(),
            region_audit_file: "log/treasure_regions.log".to_string(),
            bad_tiles: None,
            exclusions: None,
        }
    }
}

impl TreasureConfig {
    /// Defaults when the file is absent; a file that exists must parse.
    pub fn load(root: &Path) -> Result<Self, String> {
        let path = root.join(TREASURE_CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(format!("failed to read {}: {}", path.display(), err)),
        };
        Self::parse(&content).map_err(|err| format!("{}: {}", path.display(), err))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|err| err.to_string())?;
        if config.world_width <= 0 || config.world_height <= 0 {
            return Err(format!(
                "world size must be positive, got {}x{}",
                config.world_width, config.world_height
            ));
        }
        Ok(config)
    }

    pub fn world_size(&self) -> (i32, i32) {
        (self.world_width, self.world_height)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            fan_out_attempts: self.fan_out_attempts,
            fan_out_range: self.fan_out_range,
            reachability_radius: self.reachability_radius,
            path_node_budget: self.path_node_budget,
            path_time_budget: self.path_time_budget_ms.map(Duration::from_millis),
            region_cache_size: self.region_cache_size,
        }
    }

    pub fn bad_tile_registry(&self) -> BadTileRegistry {
        match &self.bad_tiles {
            Some(ranges) => BadTileRegistry::from_ranges(ranges),
            None => BadTileRegistry::builtin(),
        }
    }

    pub fn exclusion_table(&self) -> ExclusionTable {
        self.exclusions.clone().unwrap_or_else(ExclusionTable::builtin)
    }

    pub fn files(&self, root: &Path) -> TreasureFiles {
        TreasureFiles {
            candidates: root.join(&self.candidates_file),
            legacy: root.join(&self.legacy_file),
            bad_tile_audit: root.join(&self.bad_tile_audit_file),
            region_audit: root.join(&self.region_audit_file),
        }
    }
}
