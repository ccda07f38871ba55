// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// League teams shown on the draft board, in display order.
    pub teams: Vec<String>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for strategy.toml.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    recommend: RecommendConfig,
    #[serde(default)]
    scoring: ScoringConfig,
    api: ApiConfig,
    #[serde(default)]
    storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub recommend: RecommendConfig,
    pub scoring: ScoringConfig,
}

/// How many recommendations to show per position, and from which pool.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub per_position_count: usize,
    /// Leave players already on the priority list out of the candidate pool.
    pub exclude_priority: bool,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        RecommendConfig {
            per_position_count: 5,
            exclude_priority: false,
        }
    }
}

/// Tiering constants. The defaults are empirical and reproduce the
/// long-standing board ordering; tune with care.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub avg_weight: f64,
    pub total_weight: f64,
    pub adp_weight: f64,
    /// Divisor turning ADP into points in both value and base scores.
    pub adp_scale: f64,
    /// Rank percentile (0 = best) at or below which a player is Proven or Value.
    pub percentile_threshold: f64,
    /// Players with this many games or fewer are always Upside.
    pub min_games: f64,
    pub unranked_adp: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            avg_weight: 0.6,
            total_weight: 0.2,
            adp_weight: 0.2,
            adp_scale: 120.0,
            percentile_threshold: 0.30,
            min_games: 4.0,
            unranked_adp: crate::catalog::player::UNRANKED_ADP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, or a path to a local JSON/CSV player export.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Mirror saved state to `{base_url}/{key}` as well as the local store.
    #[serde(default)]
    pub remote_sync: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub debounce_ms: u64,
    /// Document keys. Each selection set is saved as a whole under its own
    /// key, which `RemoteStore` maps to `{base_url}/{key}`.
    pub priority_key: String,
    pub roster_key: String,
    pub hidden_key: String,
    pub league_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: "nrl-draft.db".into(),
            debounce_ms: 500,
            priority_key: "priority_list".into(),
            roster_key: "drafted_players".into(),
            hidden_key: "hidden_players".into(),
            league_key: "league".into(),
        }
    }
}

impl StorageConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Every document key, selection sets first.
    pub fn keys(&self) -> [&str; 4] {
        [
            &self.priority_key,
            &self.roster_key,
            &self.hidden_key,
            &self.league_key,
        ]
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the full application config from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        strategy: StrategyConfig {
            recommend: strategy_file.recommend,
            scoring: strategy_file.scoring,
        },
        api: strategy_file.api,
        storage: strategy_file.storage,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the crate root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    // League
    if config.league.teams.is_empty() {
        return Err(invalid("league.teams", "must list at least one team"));
    }
    let mut seen = HashSet::new();
    for team in &config.league.teams {
        if team.trim().is_empty() {
            return Err(invalid("league.teams", "team names must not be blank"));
        }
        if !seen.insert(team.as_str()) {
            return Err(invalid("league.teams", format!("duplicate team '{team}'")));
        }
    }

    // Recommendation
    if config.strategy.recommend.per_position_count == 0 {
        return Err(invalid("recommend.per_position_count", "must be at least 1"));
    }

    // Scoring
    let s = &config.strategy.scoring;
    let weights: &[(&str, f64)] = &[
        ("scoring.avg_weight", s.avg_weight),
        ("scoring.total_weight", s.total_weight),
        ("scoring.adp_weight", s.adp_weight),
    ];
    for (name, val) in weights {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be finite and >= 0, got {val}")));
        }
    }
    if !(s.adp_scale.is_finite() && s.adp_scale > 0.0) {
        return Err(invalid(
            "scoring.adp_scale",
            format!("must be > 0, got {}", s.adp_scale),
        ));
    }
    if !(0.0..=1.0).contains(&s.percentile_threshold) {
        return Err(invalid(
            "scoring.percentile_threshold",
            format!(
                "must be between 0.0 and 1.0 inclusive, got {}",
                s.percentile_threshold
            ),
        ));
    }
    if !s.min_games.is_finite() || s.min_games < 0.0 {
        return Err(invalid(
            "scoring.min_games",
            format!("must be >= 0, got {}", s.min_games),
        ));
    }
    if !(s.unranked_adp.is_finite() && s.unranked_adp > 0.0) {
        return Err(invalid(
            "scoring.unranked_adp",
            format!("must be > 0, got {}", s.unranked_adp),
        ));
    }

    // API and storage
    if config.api.base_url.trim().is_empty() {
        return Err(invalid("api.base_url", "must not be empty"));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0"));
    }
    if config.storage.debounce_ms == 0 {
        return Err(invalid("storage.debounce_ms", "must be greater than 0"));
    }
    let keys = config.storage.keys();
    if keys.iter().any(|k| k.trim().is_empty()) {
        return Err(invalid("storage", "state keys must not be empty"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = keys.iter().find(|k| !seen.insert(**k)) {
        return Err(invalid(
            "storage",
            format!("state key '{dup}' is used more than once"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
