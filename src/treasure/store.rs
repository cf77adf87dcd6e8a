use crate::net::packet::{PacketReader, PacketWriter};
use crate::telemetry::logging;
use crate::world::position::Point2D;
use crate::world::rng::WorldRng;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Picks tried before giving up on finding a free spot.
pub const SELECTION_ATTEMPTS: u32 = 100;

const RECORD_SIZE: usize = 8;

#[derive(Debug)]
pub enum StoreError {
    Read(PathBuf, String),
    Write(PathBuf, String),
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Read(path, msg) => write!(f, "failed to read {}: {}", path.display(), msg),
            StoreError::Write(path, msg) => write!(f, "failed to write {}: {}", path.display(), msg),
            StoreError::Corrupt(msg) => write!(f, "corrupt candidate file: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Found(Point2D),
    /// Every attempt hit an occupied spot, or the list is empty.
    Exhausted,
}

impl SelectOutcome {
    /// The chosen point, or `Point2D::ZERO` when nothing was found.
    pub fn point(self) -> Point2D {
        match self {
            SelectOutcome::Found(point) => point,
            SelectOutcome::Exhausted => Point2D::ZERO,
        }
    }
}

/// The persisted chest candidates consulted when a treasure map is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateStore {
    locations: Vec<Point2D>,
}

impl CandidateStore {
    pub fn new(locations: Vec<Point2D>) -> Self {
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[Point2D] {
        &self.locations
    }

    /// Adds points whose x/y is not present yet, keeping the existing order.
    pub fn union(&mut self, points: impl IntoIterator<Item = Point2D>) -> usize {
        let mut seen: HashSet<Point2D> = self.locations.iter().copied().collect();
        let before = self.locations.len();
        for point in points {
            if seen.insert(point) {
                self.locations.push(point);
            }
        }
        self.locations.len() - before
    }

    /// `u32` record count, then `(i32 x, i32 y)` per record, little-endian.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = PacketWriter::with_capacity(4 + self.locations.len() * RECORD_SIZE);
        writer.write_u32_le(self.locations.len() as u32);
        for point in &self.locations {
            writer.write_i32_le(point.x);
            writer.write_i32_le(point.y);
        }
        writer.into_vec()
    }

    pub fn decode(data: &[u8]) -> Result<Self, StoreError> {
        let mut reader = PacketReader::new(data);
        let count = reader
            .read_u32_le()
            .ok_or_else(|| StoreError::Corrupt("missing record count".to_string()))?
            as usize;
        let expected = count.saturating_mul(RECORD_SIZE);
        if reader.remaining() != expected {
            return Err(StoreError::Corrupt(format!(
                "{} records need {} bytes, found {}",
                count,
                expected,
                reader.remaining()
            )));
        }
        let mut locations = Vec::with_capacity(count);
        for _ in 0..count {
            let x = reader.read_i32_le();
            let y = reader.read_i32_le();
            match (x, y) {
                (Some(x), Some(y)) => locations.push(Point2D { x, y }),
                _ => return Err(StoreError::Corrupt("record cut short".to_string())),
            }
        }
        Ok(Self { locations })
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Read(path.to_path_buf(), err.to_string())),
        };
        Self::decode(&data).map(Some)
    }

    /// Writes beside the target and renames over it, so readers never see a
    /// half-written file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| StoreError::Write(parent.to_path_buf(), err.to_string()))?;
            }
        }
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, self.encode())
            .map_err(|err| StoreError::Write(temp_path.clone(), err.to_string()))?;
        fs::rename(&temp_path, path).map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Write(path.to_path_buf(), err.to_string())
        })
    }

    /// Uniform random pick, retried while `is_occupied` says the spot is
    /// taken. `warn` is called once if all attempts fail.
    pub fn select<O, W>(&self, rng: &mut WorldRng, attempts: u32, mut is_occupied: O, mut warn: W) -> SelectOutcome
    where
        O: FnMut(Point2D) -> bool,
        W: FnMut(&str),
    {
        if self.locations.is_empty() {
            warn("no treasure locations loaded; using sentinel location");
            return SelectOutcome::Exhausted;
        }
        for _ in 0..attempts {
            let point = self.locations[rng.roll_index(self.locations.len())];
            if !is_occupied(point) {
                return SelectOutcome::Found(point);
            }
        }
        warn(&format!(
            "running out of treasure locations: {} attempts over {} candidates all occupied",
            attempts,
            self.locations.len()
        ));
        SelectOutcome::Exhausted
    }

    /// `select` with the standard attempt count, warnings to the treasure log.
    pub fn pick_location<O>(&self, rng: &mut WorldRng, is_occupied: O) -> SelectOutcome
    where
        O: FnMut(Point2D) -> bool,
    {
        self.select(rng, SELECTION_ATTEMPTS, is_occupied, |message| {
            logging::log_treasure(message)
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
