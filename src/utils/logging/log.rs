//! Consistent log lines for file-level work: searching the month folder,
//! reading spreadsheets and writing the cleaned table.

use std::path::Path;
use std::time::Duration;

/// Log the start of a file operation
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log a finished file operation
///
/// # Arguments
/// * `operation` - Past-tense verb, e.g. "read" or "wrote"
/// * `path` - File or folder the operation touched
/// * `count` - Number of `unit`s handled
/// * `unit` - What was counted ("rows", "spreadsheets")
/// * `elapsed` - Wall time, when measured
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    count: usize,
    unit: &str,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "{} {} {} at {} in {:.2?}",
            capitalize(operation),
            count,
            unit,
            path.display(),
            duration
        ),
        None => log::info!("{} {} {} at {}", capitalize(operation), count, unit, path.display()),
    }
}

/// Log a recoverable problem, optionally tied to a file
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{}: {}", message, path.display()),
        None => log::warn!("{message}"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
