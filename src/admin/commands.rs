use crate::cartography::map_item::MapItem;
use crate::telemetry::logging;
use crate::treasure::store::{CandidateStore, SelectOutcome};
use crate::treasure::{generate_locations, TreasureSources};
use crate::world::query::WorldQuery;
use crate::world::rng::WorldRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    GenerateTreasure,
    TreasureCount,
    TreasurePick,
    MapDisplay {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: i32,
        height: i32,
    },
    Unknown(String),
}

pub fn parse_admin_command(message: &str) -> Result<Option<AdminCommand>, String> {
    let trimmed = message.trim();
    if !trimmed.starts_with('!') {
        return Ok(None);
    }

    let mut parts = trimmed[1..].split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| "admin command missing name".to_string())?;
    let command = command.to_ascii_lowercase();
    let parsed = match command.as_str() {
        "gentreasure" | "generatetreasure" => AdminCommand::GenerateTreasure,
        "treasurecount" => AdminCommand::TreasureCount,
        "treasurepick" => AdminCommand::TreasurePick,
        "mapdisplay" => AdminCommand::MapDisplay {
            x1: parse_i32(parts.next())?,
            y1: parse_i32(parts.next())?,
            x2: parse_i32(parts.next())?,
            y2: parse_i32(parts.next())?,
            width: parse_i32(parts.next())?,
            height: parse_i32(parts.next())?,
        },
        _ => AdminCommand::Unknown(command),
    };
    Ok(Some(parsed))
}

fn parse_i32(value: Option<&str>) -> Result<i32, String> {
    let value = value.ok_or_else(|| "admin command missing coordinate value".to_string())?;
    value
        .parse::<i32>()
        .map_err(|_| format!("admin command expected i32, got '{value}'"))
}

/// State an operator command may read or replace.
pub struct AdminContext<'a, W: WorldQuery> {
    pub sources: TreasureSources<'a, W>,
    pub store: CandidateStore,
    pub rng: WorldRng,
    pub selection_attempts: u32,
    pub world_size: (i32, i32),
}

/// Runs one command and returns the lines to show the operator.
pub fn execute_admin_command<W: WorldQuery>(
    command: &AdminCommand,
    context: &mut AdminContext<'_, W>,
) -> Vec<String> {
    match command {
        AdminCommand::GenerateTreasure => {
            let mut lines = Vec::new();
            let mut progress = |message: &str| {
                logging::log_game(message);
                lines.push(message.to_string());
            };
            match generate_locations(&context.sources, &mut context.rng, &mut progress) {
                Ok((store, _)) => context.store = store,
                Err(err) => lines.push(err.to_string()),
            }
            lines
        }
        AdminCommand::TreasureCount => {
            vec![format!("{} treasure locations loaded", context.store.len())]
        }
        AdminCommand::TreasurePick => {
            let outcome = context.store.select(
                &mut context.rng,
                context.selection_attempts,
                |_| false,
                logging::log_treasure,
            );
            match outcome {
                SelectOutcome::Found(point) => vec![format!("picked {} {}", point.x, point.y)],
                SelectOutcome::Exhausted => vec![format!(
                    "no free location, using {} {}",
                    outcome.point().x,
                    outcome.point().y
                )],
            }
        }
        AdminCommand::MapDisplay {
            x1,
            y1,
            x2,
            y2,
            width,
            height,
        } => map_display_preview(context.world_size, [*x1, *y1, *x2, *y2], *width, *height),
        AdminCommand::Unknown(name) => vec![format!("unknown command: {}", name)],
    }
}

/// Shows how a display window maps its corners and centre.
fn map_display_preview(world_size: (i32, i32), corners: [i32; 4], width: i32, height: i32) -> Vec<String> {
    let mut map = MapItem::with_world_size(world_size.0, world_size.1);
    let [x1, y1, x2, y2] = corners;
    map.set_display(x1, y1, x2, y2, width, height);
    let bounds = map.bounds();
    let mut lines = vec![format!(
        "bounds ({},{})-({},{}) grid {}x{}",
        bounds.x,
        bounds.y,
        bounds.end_x(),
        bounds.end_y(),
        width,
        height
    )];
    for (gx, gy) in [
        (0, 0),
        (width / 2, height / 2),
        (width.saturating_sub(1), height.saturating_sub(1)),
    ] {
        match map.convert_to_world(gx, gy) {
            Ok(world) => lines.push(format!("grid ({},{}) -> world ({},{})", gx, gy, world.x, world.y)),
            Err(err) => {
                lines.push(err.to_string());
                return lines;
            }
        }
    }
    let center = (bounds.x + bounds.width / 2, bounds.y + bounds.height / 2);
    match map.convert_to_map(center.0, center.1) {
        Ok(grid) => lines.push(format!(
            "world ({},{}) -> grid ({},{})",
            center.0, center.1, grid.x, grid.y
        )),
        Err(err) => lines.push(err.to_string()),
    }
    lines
}
