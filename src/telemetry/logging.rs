use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum LogFile {
    Error,
    Game,
    Treasure,
}

struct Logger {
    files: Mutex<BTreeMap<LogFile, File>>,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();
static TREASURE_WARNINGS: AtomicUsize = AtomicUsize::new(0);

const HEADER_LINE: &str = "-------------------------------------------------------------------------------";
const HEADER_TITLE: &str = "Treasure cartography";

/// Opens the operator logs under `<root>/log`. Calls before this are dropped.
pub fn init(root: &Path) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let log_dir = root.join("log");
    std::fs::create_dir_all(&log_dir)
        .map_err(|err| format!("log directory create failed: {}", err))?;

    let mut files = BTreeMap::new();
    for (log_file, name, header) in [
        (LogFile::Error, "error.log", false),
        (LogFile::Game, "game.log", true),
        (LogFile::Treasure, "treasure.log", true),
    ] {
        let path = log_dir.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| format!("open log {} failed: {}", name, err))?;
        if header && file.metadata().map(|m| m.len()).unwrap_or(0) == 0 {
            write_header(&mut file, name)?;
        }
        files.insert(log_file, file);
    }

    LOGGER
        .set(Logger {
            files: Mutex::new(files),
        })
        .map_err(|_| "log system already initialized".to_string())?;
    Ok(())
}

pub fn log_game(message: &str) {
    log_timestamped(LogFile::Game, message);
}

pub fn log_error(message: &str) {
    log_timestamped(LogFile::Error, message);
}

/// Treasure subsystem warnings: stale pins, exhausted placement retries.
pub fn log_treasure(message: &str) {
    TREASURE_WARNINGS.fetch_add(1, Ordering::Relaxed);
    log_timestamped(LogFile::Treasure, message);
}

/// Treasure warnings issued since start, counted even before `init`.
pub fn treasure_warnings() -> usize {
    TREASURE_WARNINGS.load(Ordering::Relaxed)
}

fn log_timestamped(log_file: LogFile, message: &str) {
    if let Some(logger) = LOGGER.get() {
        let line = format!("{} (0): {message}\n", format_timestamp(unix_timestamp()));
        let _ = write_line(logger, log_file, &line);
    }
}

fn write_line(logger: &Logger, log_file: LogFile, line: &str) -> std::io::Result<()> {
    let mut files = logger
        .files
        .lock()
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "log lock poisoned"))?;
    if let Some(file) = files.get_mut(&log_file) {
        file.write_all(line.as_bytes())?;
        file.flush()?;
    }
    Ok(())
}

fn write_header(file: &mut File, name: &str) -> Result<(), String> {
    let timestamp = format_timestamp(unix_timestamp());
    writeln!(file, "{HEADER_LINE}\n{HEADER_TITLE}\n{name} - started {timestamp}")
        .map_err(|err| format!("header write failed: {}", err))
}

/// `DD.MM.YYYY HH:MM:SS` in UTC.
pub fn format_timestamp(ts: i64) -> String {
    let secs = ts.max(0);
    let days = secs / 86_400;
    let seconds_of_day = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:02}.{:02}.{} {:02}:{:02}:{:02}",
        day,
        month,
        year,
        seconds_of_day / 3_600,
        (seconds_of_day % 3_600) / 60,
        seconds_of_day % 60
    )
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// days since 1970-01-01 to a proleptic Gregorian date
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch_and_leap_day() {
        assert_eq!(format_timestamp(0), "01.01.1970 00:00:00");
        // 2024-02-29 13:45:07 UTC
        assert_eq!(format_timestamp(1_709_214_307), "29.02.2024 13:45:07");
    }

    #[test]
    fn logging_before_init_is_silent() {
        log_treasure("dropped");
        log_error("dropped");
    }

    #[test]
    fn treasure_warnings_are_counted() {
        let before = treasure_warnings();
        log_treasure("counted");
        assert!(treasure_warnings() > before);
    }
}
