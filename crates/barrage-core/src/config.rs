// Configuration loading and parsing (session.toml, app.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{DraftMethod, MAX_EXTRA_CANDIDATES, MAX_PLAYERS};

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
    pub session: SessionConfig,
    pub catalog_filter: CatalogFilter,
    /// SQLite path. Relative paths resolve against the working directory;
    /// an empty string selects the platform data directory.
    pub db_path: String,
    pub data_paths: DataPaths,
    /// How many recent sessions feed the usage weighting.
    pub history_window: usize,
    pub log_filter: String,
}

// ---------------------------------------------------------------------------
// session.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct SessionFile {
    session: SessionConfig,
    #[serde(default)]
    catalog: CatalogFilter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Player display names. Trimmed on load.
    pub players: Vec<String>,
    /// Surplus faction/role pairs on top of one per player (0, 1 or 2).
    pub extra_candidates: usize,
    #[serde(default = "default_board_variant")]
    pub board_variant: String,
    /// Pre-selected allocation method. `None` asks on the setup screen.
    #[serde(default)]
    pub default_method: Option<DraftMethod>,
}

fn default_board_variant() -> String {
    "standard".to_string()
}

/// Names of the factions and roles in play. Empty lists keep the whole catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    database: DatabaseSection,
    data_paths: DataPaths,
    #[serde(default)]
    history: HistorySection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HistorySection {
    window: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        HistorySection { window: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            filter: "barrage=info,warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub factions: String,
    pub roles: String,
    pub contracts: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/session.toml` and
/// `config/app.toml`, both relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- session.toml (required) ---
    let session_path = config_dir.join("session.toml");
    let session_text = read_file(&session_path)?;
    let session_file: SessionFile =
        toml::from_str(&session_text).map_err(|e| ConfigError::ParseError {
            path: session_path.clone(),
            source: e,
        })?;

    // --- app.toml (required) ---
    let app_path = config_dir.join("app.toml");
    let app_text = read_file(&app_path)?;
    let app_file: AppFile = toml::from_str(&app_text).map_err(|e| ConfigError::ParseError {
        path: app_path.clone(),
        source: e,
    })?;

    let mut session = session_file.session;
    session.players = session
        .players
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let config = Config {
        session,
        catalog_filter: session_file.catalog,
        db_path: app_file.database.path,
        data_paths: app_file.data_paths,
        history_window: app_file.history.window,
        log_filter: app_file.logging.filter,
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
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

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

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

impl Config {
    /// Where the SQLite file lives, given the directory relative paths resolve against.
    pub fn resolve_db_path(&self, base_dir: &Path) -> PathBuf {
        if self.db_path == ":memory:" {
            return PathBuf::from(":memory:");
        }
        if self.db_path.is_empty() {
            let data_dir = directories::ProjectDirs::from("", "", "barrage")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| base_dir.to_path_buf());
            return data_dir.join("barrage.db");
        }
        let path = Path::new(&self.db_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Number of faction/role pairs the sampler must produce.
    pub fn pair_count(&self) -> usize {
        self.session.players.len() + self.session.extra_candidates
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let players = &config.session.players;
    if players.is_empty() || players.len() > MAX_PLAYERS {
        return Err(ConfigError::ValidationError {
            field: "session.players".into(),
            message: format!("must list 1 to {MAX_PLAYERS} players, got {}", players.len()),
        });
    }

    let mut seen = HashSet::new();
    for (i, name) in players.iter().enumerate() {
        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("session.players[{i}]"),
                message: "player name must not be empty".into(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::ValidationError {
                field: format!("session.players[{i}]"),
                message: format!("duplicate player name '{name}'"),
            });
        }
    }

    if config.session.extra_candidates > MAX_EXTRA_CANDIDATES {
        return Err(ConfigError::ValidationError {
            field: "session.extra_candidates".into(),
            message: format!(
                "must be between 0 and {MAX_EXTRA_CANDIDATES}, got {}",
                config.session.extra_candidates
            ),
        });
    }

    if config.session.board_variant.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "session.board_variant".into(),
            message: "must not be empty".into(),
        });
    }

    if config.history_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "history.window".into(),
            message: "must be > 0".into(),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("data_paths.factions", &config.data_paths.factions),
        ("data_paths.roles", &config.data_paths.roles),
        ("data_paths.contracts", &config.data_paths.contracts),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// Fresh temp dir with `config/app.toml` copied from defaults.
    fn temp_config_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            project_root().join("defaults/app.toml"),
            tmp.join("config/app.toml"),
        )
        .unwrap();
        tmp
    }

    fn write_session(tmp: &Path, body: &str) {
        fs::write(tmp.join("config/session.toml"), body).unwrap();
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_project_defaults() {
        let tmp = std::env::temp_dir().join("config_test_project_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        for file in ["session.toml", "app.toml"] {
            fs::copy(
                project_root().join("defaults").join(file),
                tmp.join("config").join(file),
            )
            .unwrap();
        }

        let config = load_config_from(&tmp).expect("should load default config");
        assert_eq!(config.session.players.len(), 4);
        assert_eq!(config.session.players[0], "Player 1");
        assert_eq!(config.session.extra_candidates, 1);
        assert_eq!(config.session.board_variant, "standard");
        assert!(config.session.default_method.is_none());
        assert!(config.catalog_filter.factions.is_empty());
        assert_eq!(config.db_path, "barrage.db");
        assert_eq!(config.data_paths.factions, "data/factions.csv");
        assert_eq!(config.history_window, 10);
        assert_eq!(config.log_filter, "barrage=info,warn");
        assert_eq!(config.pair_count(), 5);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn player_names_are_trimmed_and_method_parsed() {
        let tmp = temp_config_dir("config_test_trim");
        write_session(
            &tmp,
            r#"
[session]
players = ["  Ann ", "Bo"]
extra_candidates = 2
default_method = "auction"

[catalog]
factions = ["USA", "Italy"]
"#,
        );

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.session.players, vec!["Ann", "Bo"]);
        assert_eq!(config.session.default_method, Some(DraftMethod::Auction));
        assert_eq!(config.catalog_filter.factions, vec!["USA", "Italy"]);
        assert!(config.catalog_filter.roles.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_player_list() {
        let tmp = temp_config_dir("config_test_no_players");
        write_session(&tmp, "[session]\nplayers = []\nextra_candidates = 0\n");
        expect_validation_field(&tmp, "session.players");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_too_many_players() {
        let tmp = temp_config_dir("config_test_six_players");
        write_session(
            &tmp,
            "[session]\nplayers = [\"a\",\"b\",\"c\",\"d\",\"e\",\"f\"]\nextra_candidates = 0\n",
        );
        expect_validation_field(&tmp, "session.players");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_blank_player_name() {
        let tmp = temp_config_dir("config_test_blank_name");
        write_session(&tmp, "[session]\nplayers = [\"Ann\", \"   \"]\nextra_candidates = 0\n");
        expect_validation_field(&tmp, "session.players[1]");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_duplicate_player_name_after_trim() {
        let tmp = temp_config_dir("config_test_dup_name");
        write_session(&tmp, "[session]\nplayers = [\"Ann\", \"Ann \"]\nextra_candidates = 0\n");
        expect_validation_field(&tmp, "session.players[1]");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_extra_candidates_above_two() {
        let tmp = temp_config_dir("config_test_extra_three");
        write_session(&tmp, "[session]\nplayers = [\"Ann\"]\nextra_candidates = 3\n");
        expect_validation_field(&tmp, "session.extra_candidates");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_history_window() {
        let tmp = temp_config_dir("config_test_zero_window");
        write_session(&tmp, "[session]\nplayers = [\"Ann\"]\nextra_candidates = 0\n");
        let app_text = fs::read_to_string(tmp.join("config/app.toml")).unwrap();
        fs::write(
            tmp.join("config/app.toml"),
            app_text.replace("window = 10", "window = 0"),
        )
        .unwrap();
        expect_validation_field(&tmp, "history.window");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_session_toml() {
        let tmp = temp_config_dir("config_test_missing_session");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("session.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config_dir("config_test_invalid_toml");
        write_session(&tmp, "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("session.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("config_test_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/session.toml"), defaults_dir.join("session.toml")).unwrap();
        fs::copy(root.join("defaults/app.toml"), defaults_dir.join("app.toml")).unwrap();
        fs::write(defaults_dir.join("session.toml.example"), "# sample\n").unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/session.toml").exists());
        assert!(tmp.join("config/app.toml").exists());
        assert!(!tmp.join("config/session.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("config_test_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/session.toml"), defaults_dir.join("session.toml")).unwrap();
        fs::copy(root.join("defaults/app.toml"), defaults_dir.join("app.toml")).unwrap();
        fs::write(config_dir.join("session.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("app.toml"));
        let content = fs::read_to_string(config_dir.join("session.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("config_test_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn resolve_db_path_variants() {
        let tmp = temp_config_dir("config_test_db_path");
        write_session(&tmp, "[session]\nplayers = [\"Ann\"]\nextra_candidates = 0\n");
        let mut config = load_config_from(&tmp).unwrap();

        let base = Path::new("/work");
        assert_eq!(config.resolve_db_path(base), PathBuf::from("/work/barrage.db"));

        config.db_path = ":memory:".into();
        assert_eq!(config.resolve_db_path(base), PathBuf::from(":memory:"));

        config.db_path = "/var/lib/barrage.db".into();
        assert_eq!(config.resolve_db_path(base), PathBuf::from("/var/lib/barrage.db"));

        config.db_path = String::new();
        assert!(config.resolve_db_path(base).ends_with("barrage.db"));

        let _ = fs::remove_dir_all(&tmp);
    }
}
