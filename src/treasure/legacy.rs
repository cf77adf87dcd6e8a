use crate::telemetry::logging;
use crate::world::position::Point2D;
use std::fs;
use std::path::Path;

/// Hand-placed chest spots kept from before the generated list existed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyList {
    pub points: Vec<Point2D>,
    /// One message per line that could not be read.
    pub skipped: Vec<String>,
}

/// Exactly two whitespace-separated integers `x y` per line; `#` starts a
/// comment. Any other shape is skipped and reported.
pub fn parse_legacy(content: &str) -> LegacyList {
    let mut list = LegacyList::default();
    for (line_no, raw_line) in content.lines().enumerate() {
        let line = match raw_line.find('#') {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let x = parts.next().and_then(|value| value.parse::<i32>().ok());
        let y = parts.next().and_then(|value| value.parse::<i32>().ok());
        match (x, y, parts.next()) {
            (Some(x), Some(y), None) => list.points.push(Point2D::new(x, y)),
            _ => list
                .skipped
                .push(format!("line {}: malformed location '{}'", line_no + 1, line)),
        }
    }
    list
}

/// Missing or unreadable files yield an empty list; every problem goes to
/// the error log.
pub fn load_legacy(path: &Path) -> Vec<Point2D> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            logging::log_error(&format!(
                "legacy treasure list {} unavailable: {}",
                path.display(),
                err
            ));
            return Vec::new();
        }
    };
    let list = parse_legacy(&String::from_utf8_lossy(&bytes));
    for message in &list.skipped {
        logging::log_error(&format!("{}: {}", path.display(), message));
    }
    list.points
}
