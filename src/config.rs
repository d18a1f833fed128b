//! Demo configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--collapsed`, `--stream`, `--log-file`, etc.)
//! 2. `--config <path>`
//! 3. `$ITREE_CONFIG` environment variable (path to config file)
//! 4. Project-local `.itree.toml` in the current working directory
//! 5. Global `~/.config/itree/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// Tree model and filter settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Start every node with children collapsed.
    pub collapse_by_default: Option<bool>,
    /// A search match shows its whole subtree instead of only itself.
    pub expand_matches: Option<bool>,
    /// Fuzzy matching instead of case-insensitive substring search.
    pub fuzzy: Option<bool>,
    /// Row height used when a node carries no height hint.
    pub row_height: Option<u16>,
}

/// Streaming instrument feed settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedConfig {
    /// Replace the data on every tick.
    pub enabled: Option<bool>,
    /// Refresh interval in milliseconds.
    pub interval_ms: Option<u64>,
    /// Ticker symbols at the top level of the tree.
    pub tickers: Option<Vec<String>>,
    /// Price rows generated under each contract month.
    pub prices_per_contract: Option<usize>,
}

/// Log output settings. The terminal belongs to the UI, so logs go to a file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; logging is off when unset.
    pub file: Option<String>,
    /// Max level: "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

/// Color settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark" (default) or "light".
    pub scheme: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tree: TreeConfig,
    pub feed: FeedConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default feed refresh interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;
/// Default number of price rows per contract.
pub const DEFAULT_PRICES_PER_CONTRACT: usize = 5;
/// Default row height in terminal lines.
pub const DEFAULT_ROW_HEIGHT: u16 = 1;
/// Default ticker symbols.
pub const DEFAULT_TICKERS: [&str; 5] = ["F", "AMZN", "NFLX", "GOOG", "APPL"];

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path, which is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("ITREE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".itree.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("itree").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            tree: TreeConfig {
                collapse_by_default: other
                    .tree
                    .collapse_by_default
                    .or(self.tree.collapse_by_default),
                expand_matches: other.tree.expand_matches.or(self.tree.expand_matches),
                fuzzy: other.tree.fuzzy.or(self.tree.fuzzy),
                row_height: other.tree.row_height.or(self.tree.row_height),
            },
            feed: FeedConfig {
                enabled: other.feed.enabled.or(self.feed.enabled),
                interval_ms: other.feed.interval_ms.or(self.feed.interval_ms),
                tickers: other.feed.tickers.clone().or(self.feed.tickers),
                prices_per_contract: other
                    .feed
                    .prices_per_contract
                    .or(self.feed.prices_per_contract),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn collapse_by_default(&self) -> bool {
        self.tree.collapse_by_default.unwrap_or(false)
    }

    pub fn expand_matches(&self) -> bool {
        self.tree.expand_matches.unwrap_or(true)
    }

    pub fn fuzzy(&self) -> bool {
        self.tree.fuzzy.unwrap_or(false)
    }

    pub fn row_height(&self) -> u16 {
        self.tree.row_height.unwrap_or(DEFAULT_ROW_HEIGHT).max(1)
    }

    pub fn feed_enabled(&self) -> bool {
        self.feed.enabled.unwrap_or(false)
    }

    pub fn interval_ms(&self) -> u64 {
        self.feed.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS).max(1)
    }

    pub fn tickers(&self) -> Vec<String> {
        match &self.feed.tickers {
            Some(tickers) if !tickers.is_empty() => tickers.clone(),
            _ => DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn prices_per_contract(&self) -> usize {
        self.feed
            .prices_per_contract
            .unwrap_or(DEFAULT_PRICES_PER_CONTRACT)
    }

    pub fn log_file(&self) -> Option<&str> {
        self.log.file.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("info")
    }

    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(!cfg.collapse_by_default());
        assert!(cfg.expand_matches());
        assert!(!cfg.fuzzy());
        assert_eq!(cfg.row_height(), 1);
        assert!(!cfg.feed_enabled());
        assert_eq!(cfg.interval_ms(), 1_000);
        assert_eq!(cfg.tickers(), vec!["F", "AMZN", "NFLX", "GOOG", "APPL"]);
        assert_eq!(cfg.prices_per_contract(), 5);
        assert!(cfg.log_file().is_none());
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.theme_scheme(), "dark");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[tree]
collapse_by_default = true
expand_matches = false
fuzzy = true
row_height = 2

[feed]
enabled = true
interval_ms = 250
tickers = ["MSFT", "TSLA"]
prices_per_contract = 3

[log]
file = "/tmp/itree.log"
level = "debug"

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.collapse_by_default());
        assert!(!cfg.expand_matches());
        assert!(cfg.fuzzy());
        assert_eq!(cfg.row_height(), 2);
        assert!(cfg.feed_enabled());
        assert_eq!(cfg.interval_ms(), 250);
        assert_eq!(cfg.tickers(), vec!["MSFT", "TSLA"]);
        assert_eq!(cfg.prices_per_contract(), 3);
        assert_eq!(cfg.log_file(), Some("/tmp/itree.log"));
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[feed]
enabled = true
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.feed_enabled());
        assert_eq!(cfg.interval_ms(), 1_000);
        assert!(cfg.expand_matches());
    }

    #[test]
    fn test_empty_tickers_fall_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("[feed]\ntickers = []\n").expect("parse failed");
        assert_eq!(cfg.tickers().len(), 5);
    }

    #[test]
    fn test_zero_row_height_is_clamped() {
        let cfg: AppConfig = toml::from_str("[tree]\nrow_height = 0\n").expect("parse failed");
        assert_eq!(cfg.row_height(), 1);
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            tree: TreeConfig {
                collapse_by_default: Some(false),
                fuzzy: Some(true),
                ..Default::default()
            },
            feed: FeedConfig {
                interval_ms: Some(500),
                ..Default::default()
            },
            ..Default::default()
        };
        let over = AppConfig {
            tree: TreeConfig {
                collapse_by_default: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.collapse_by_default());
        assert!(merged.fuzzy());
        assert_eq!(merged.interval_ms(), 500);
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            log: LogConfig {
                file: Some("a.log".into()),
                level: Some("trace".into()),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_file(), Some("a.log"));
        assert_eq!(merged.log_level(), "trace");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[tree]
expand_matches = false

[feed]
prices_per_contract = 2
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(!cfg.expand_matches());
        assert_eq!(cfg.prices_per_contract(), 2);
        assert_eq!(cfg.interval_ms(), 1_000);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/itree.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[feed]
enabled = true
interval_ms = 200
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            feed: FeedConfig {
                interval_ms: Some(50),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert_eq!(cfg.interval_ms(), 50);
        assert!(cfg.feed_enabled());
    }
}
