use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{info, warn};

use crate::app::justwatch::{
    SearchConfig, DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_CONFIGS, DEFAULT_TIMEOUT_SECS,
};

pub const CONFIG_FILE: &str = "config.json";
pub const LOCAL_DB_DIR: &str = "db";
pub const LOCAL_DB_FILE: &str = "tripboard.db";
pub const DEFAULT_CACHE_DIR: &str = ".tripboard_cache";
pub const DEFAULT_POSTER_WORKERS: usize = 4;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cache_dir: Option<String>,
    pub db_path: Option<String>,
    pub search_timeout_secs: u64,
    pub search_result_limit: usize,
    /// Locales tried in order by the title resolver.
    pub search_locales: Vec<SearchConfig>,
    pub poster_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            db_path: None,
            search_timeout_secs: DEFAULT_TIMEOUT_SECS,
            search_result_limit: DEFAULT_RESULT_LIMIT,
            search_locales: DEFAULT_SEARCH_CONFIGS.clone(),
            poster_workers: DEFAULT_POSTER_WORKERS,
        }
    }
}

impl AppConfig {
    /// Store location: `db_path` from config, else `db/tripboard.db`.
    pub fn store_path(&self) -> PathBuf {
        self.db_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(local_db_path, resolve_relative_path)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    cache_dir: Option<String>,
    #[serde(alias = "database")]
    db_path: Option<String>,
    search_timeout_secs: Option<u64>,
    search_result_limit: Option<usize>,
    search_locales: Option<Vec<SearchConfig>>,
    poster_workers: Option<usize>,
}

fn merge(cfg: &mut AppConfig, parsed: RawConfig) {
    if parsed.cache_dir.is_some() {
        cfg.cache_dir = parsed.cache_dir;
    }
    if parsed.db_path.is_some() {
        cfg.db_path = parsed.db_path;
    }
    match parsed.search_timeout_secs {
        Some(0) => warn!("search_timeout_secs must be positive; keeping {}", cfg.search_timeout_secs),
        Some(n) => cfg.search_timeout_secs = n.min(120),
        None => {}
    }
    match parsed.search_result_limit {
        Some(0) => warn!("search_result_limit must be positive; keeping {}", cfg.search_result_limit),
        Some(n) => cfg.search_result_limit = n.min(50),
        None => {}
    }
    if let Some(list) = parsed.search_locales {
        let valid: Vec<SearchConfig> = list
            .into_iter()
            .filter(|c| {
                let ok = !c.region_code.trim().is_empty() && !c.language_code.trim().is_empty();
                if !ok {
                    warn!("Ignoring search locale with empty region/language in config.json");
                }
                ok
            })
            .collect();
        if valid.is_empty() {
            warn!("search_locales in config.json is empty; using the built-in list.");
        } else {
            cfg.search_locales = valid;
        }
    }
    if let Some(n) = parsed.poster_workers {
        cfg.poster_workers = n.clamp(1, 16);
    }
}

/// Read `path` and merge it over the defaults. Missing or broken files fall
/// back to defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                merge(&mut cfg, parsed);
                info!("Loaded config from {}", path.display());
            }
            Err(err) => {
                warn!("Failed to parse {} ({}). Using defaults.", path.display(), err);
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", path.display());
        }
    }

    cfg
}

pub fn load_config() -> AppConfig {
    load_config_from(&resolve_relative_path(CONFIG_FILE))
}

/// Absolute paths pass through; relative ones are anchored at the
/// executable's directory when a file already exists there, else at the
/// working directory.
pub fn resolve_relative_path(p: impl AsRef<Path>) -> PathBuf {
    let p = p.as_ref();
    if p.is_absolute() {
        return p.to_path_buf();
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let candidate = exe_dir.join(p);
        if candidate.exists() {
            return candidate;
        }
    }
    p.to_path_buf()
}

pub fn local_db_path() -> PathBuf {
    PathBuf::from(LOCAL_DB_DIR).join(LOCAL_DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_cfg(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.json"));
        assert_eq!(cfg.search_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.search_locales.len(), DEFAULT_SEARCH_CONFIGS.len());
        assert_eq!(cfg.store_path(), local_db_path());
    }

    #[test]
    fn values_are_merged_over_defaults() {
        let (_dir, path) = write_cfg(
            r#"{
                "db_path": "/tmp/trip.db",
                "search_timeout_secs": 3,
                "search_locales": [
                    {"region_code": "GB", "language_code": "en", "display_name": "United Kingdom"},
                    {"region_code": "", "language_code": "en", "display_name": "Broken"}
                ],
                "poster_workers": 99
            }"#,
        );
        let cfg = load_config_from(&path);
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/trip.db"));
        assert_eq!(cfg.search_timeout_secs, 3);
        assert_eq!(cfg.search_result_limit, DEFAULT_RESULT_LIMIT);
        assert_eq!(cfg.search_locales.len(), 1);
        assert_eq!(cfg.search_locales[0].region_code, "GB");
        assert_eq!(cfg.poster_workers, 16);
    }

    #[test]
    fn zero_values_and_bad_json_keep_defaults() {
        let (_dir, path) = write_cfg(r#"{"search_timeout_secs": 0, "search_locales": []}"#);
        let cfg = load_config_from(&path);
        assert_eq!(cfg.search_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.search_locales.len(), DEFAULT_SEARCH_CONFIGS.len());

        let (_dir, path) = write_cfg("{ not json");
        let cfg = load_config_from(&path);
        assert_eq!(cfg.poster_workers, DEFAULT_POSTER_WORKERS);
    }

    #[test]
    fn absolute_paths_pass_through() {
        let abs = std::env::temp_dir().join("x.db");
        assert_eq!(resolve_relative_path(&abs), abs);
    }
}
