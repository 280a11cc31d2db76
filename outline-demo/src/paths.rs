//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "rowmap";
const APPLICATION: &str = "outline-demo";

/// Log file name inside the cache directory.
const LATEST_LOG: &str = "latest.log";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 10;

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory, where logs are written.
///
/// - Linux: `$XDG_CACHE_HOME/outline-demo` or `~/.cache/outline-demo`
/// - macOS: `~/Library/Caches/dev.rowmap.outline-demo`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the path of the default config file.
///
/// - Linux: `$XDG_CONFIG_HOME/outline-demo/config.json`
/// - macOS: `~/Library/Application Support/dev.rowmap.outline-demo/config.json`
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
}

/// Path of the log file for this run, falling back to the working directory.
///
/// Archives the previous run's log first.
pub fn prepare_log_file() -> PathBuf {
    let Some(cache) = cache_dir().filter(|dir| fs::create_dir_all(dir).is_ok()) else {
        return PathBuf::from("outline-demo.log");
    };
    let latest = cache.join(LATEST_LOG);
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, cache.join(format!("{timestamp}.log")));
    }
    prune_old_logs(&cache);
    latest
}

/// Remove archived logs beyond `MAX_OLD_LOGS`, oldest first.
fn prune_old_logs(cache: &Path) {
    let Ok(entries) = fs::read_dir(cache) else { return };
    let mut logs: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();
    logs.sort_by_key(|entry| entry.metadata().and_then(|meta| meta.modified()).ok());
    let excess = logs.len().saturating_sub(MAX_OLD_LOGS);
    for entry in logs.iter().take(excess) {
        let _ = fs::remove_file(entry.path());
    }
}
