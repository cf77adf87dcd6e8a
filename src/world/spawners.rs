use crate::world::position::Point3D;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUCKET_SIZE: i32 = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawner {
    pub race_number: i64,
    pub location: Point3D,
    pub home_range: i32,
    pub amount: u16,
    pub regen: u16,
}

/// Read-only copy of every active spawner, taken once and handed to the
/// pipeline. Locations are bucketed by 32×32 blocks for radius queries.
#[derive(Debug, Clone, Default)]
pub struct SpawnerSnapshot {
    spawners: Vec<Spawner>,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl SpawnerSnapshot {
    pub fn new(spawners: Vec<Spawner>) -> Self {
        let mut buckets: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (index, spawner) in spawners.iter().enumerate() {
            buckets
                .entry(bucket_of(spawner.location.x, spawner.location.y))
                .or_default()
                .push(index);
        }
        Self { spawners, buckets }
    }

    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spawner> {
        self.spawners.iter()
    }

    /// Spawners whose location lies within `radius` (square range) of
    /// `center`, in snapshot order.
    pub fn within(&self, center: Point3D, radius: i32) -> Vec<&Spawner> {
        let radius = radius.max(0);
        let (min_bx, min_by) = bucket_of(center.x - radius, center.y - radius);
        let (max_bx, max_by) = bucket_of(center.x + radius, center.y + radius);
        let mut indices = Vec::new();
        for by in min_by..=max_by {
            for bx in min_bx..=max_bx {
                if let Some(bucket) = self.buckets.get(&(bx, by)) {
                    indices.extend(bucket.iter().copied());
                }
            }
        }
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|index| &self.spawners[index])
            .filter(|spawner| spawner.location.in_range(center, radius))
            .collect()
    }
}

fn bucket_of(x: i32, y: i32) -> (i32, i32) {
    (x.div_euclid(BUCKET_SIZE), y.div_euclid(BUCKET_SIZE))
}

/// Loads a spawner database: `race x y z radius amount regen` per line,
/// `#` comments, a lone `0` terminates the list.
pub fn load_spawners(path: &Path) -> Result<Vec<Spawner>, String> {
    let bytes = fs::read(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let content = String::from_utf8_lossy(&bytes);
    parse_spawners(&content)
}

pub fn parse_spawners(content: &str) -> Result<Vec<Spawner>, String> {
    let mut spawners = Vec::new();
    for (line_no, raw_line) in content.lines().enumerate() {
        let line_no = line_no + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if line == "0" {
            break;
        }
        spawners.push(parse_spawner(line, line_no)?);
    }
    Ok(spawners)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_spawner(line: &str, line_no: usize) -> Result<Spawner, String> {
    let mut parts = line.split_whitespace();
    let race_number = parse_field::<i64>(parts.next(), "race", line_no)?;
    let x = parse_field::<i32>(parts.next(), "x", line_no)?;
    let y = parse_field::<i32>(parts.next(), "y", line_no)?;
    let z = parse_field::<i32>(parts.next(), "z", line_no)?;
    let home_range = parse_field::<i32>(parts.next(), "radius", line_no)?;
    let amount = parse_field::<u16>(parts.next(), "amount", line_no)?;
    let regen = parse_field::<u16>(parts.next(), "regen", line_no)?;
    Ok(Spawner {
        race_number,
        location: Point3D::new(x, y, z),
        home_range,
        amount,
        regen,
    })
}

fn parse_field<T: std::str::FromStr>(
    value: Option<&str>,
    label: &str,
    line_no: usize,
) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("spawners.db line {} missing {}", line_no, label))?;
    value
        .parse::<T>()
        .map_err(|_| format!("spawners.db line {} invalid {}", line_no, label))
}
