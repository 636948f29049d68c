//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! TOML file, environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corelex_db::{DbConfig, LoadMode};
use corelex_listing::GroupingMode;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub load_mode: LoadMode,
    pub strict_ordering: bool,
    pub disable_cache: bool,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            load_mode: LoadMode::Mmap,
            strict_ordering: false,
            disable_cache: false,
            rate_limit_rps: DEFAULT_RATE_LIMIT_RPS,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

/// Keys accepted in the TOML config file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    load_mode: Option<String>,
    strict_ordering: Option<bool>,
    disable_cache: Option<bool>,
    rate_limit_rps: Option<u32>,
    rate_limit_burst: Option<u32>,
    #[serde(flatten)]
    extra: toml::Table,
}

#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    load_mode: Option<LoadMode>,
    strict_ordering: bool,
    disable_cache: bool,
}

impl Config {
    /// Build the configuration from the process arguments and environment.
    pub fn load() -> Result<Self> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Build the configuration from explicit sources. `args` excludes the
    /// program name.
    pub fn from_sources<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let cli = parse_args(args);
        let mut config = Config::default();

        let config_path = cli
            .config_path
            .clone()
            .or_else(|| env("CORELEX_CONFIG").map(PathBuf::from));
        if let Some(path) = config_path {
            config.apply_file(&path)?;
        }

        config.apply_env(&env);
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.data_dir, self.load_mode)
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        if self.strict_ordering {
            GroupingMode::Validate
        } else {
            GroupingMode::Trust
        }
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let file: FileConfig = toml::from_str(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        self.apply_file_config(file);
        Ok(())
    }

    fn apply_file_config(&mut self, file: FileConfig) {
        for key in file.extra.keys() {
            warn!("config key {key} ignored: unknown key");
        }
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(raw) = file.load_mode {
            match parse_load_mode(&raw) {
                Some(mode) => self.load_mode = mode,
                None => warn!("config key load_mode ignored: unknown mode {raw}"),
            }
        }
        if let Some(strict) = file.strict_ordering {
            self.strict_ordering = strict;
        }
        if let Some(disable) = file.disable_cache {
            self.disable_cache = disable;
        }
        match file.rate_limit_rps {
            Some(0) => warn!("config key rate_limit_rps ignored: must be positive"),
            Some(rps) => self.rate_limit_rps = rps,
            None => {}
        }
        match file.rate_limit_burst {
            Some(0) => warn!("config key rate_limit_burst ignored: must be positive"),
            Some(burst) => self.rate_limit_burst = burst,
            None => {}
        }
    }

    fn apply_env<E: Fn(&str) -> Option<String>>(&mut self, env: &E) {
        if let Some(host) = env("HOST") {
            self.host = host;
        }
        if let Some(port) = env("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(dir) = env("CORELEX_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(mode) = env("CORELEX_LOAD_MODE").as_deref().and_then(parse_load_mode) {
            self.load_mode = mode;
        }
        if let Some(strict) = env("CORELEX_STRICT_ORDERING")
            .and_then(|v| v.trim().to_ascii_lowercase().parse::<bool>().ok())
        {
            self.strict_ordering = strict;
        }
        if let Some(rps) = env("RATE_LIMIT_RPS").as_deref().and_then(parse_positive) {
            self.rate_limit_rps = rps;
        }
        if let Some(burst) = env("RATE_LIMIT_BURST").as_deref().and_then(parse_positive) {
            self.rate_limit_burst = burst;
        }
    }

    fn apply_cli(&mut self, cli: CliArgs) {
        if let Some(dir) = cli.data_dir {
            self.data_dir = dir;
        }
        if let Some(mode) = cli.load_mode {
            self.load_mode = mode;
        }
        if cli.strict_ordering {
            self.strict_ordering = true;
        }
        if cli.disable_cache {
            self.disable_cache = true;
        }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> CliArgs {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => cli.disable_cache = true,
            "--strict-ordering" => cli.strict_ordering = true,
            "--data-dir" => {
                if let Some(path) = args.next() {
                    cli.data_dir = Some(PathBuf::from(path));
                }
            }
            "--config" => {
                if let Some(path) = args.next() {
                    cli.config_path = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--data-dir=") {
                    cli.data_dir = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--config=") {
                    cli.config_path = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli.load_mode = parse_load_mode(mode);
                    if cli.load_mode.is_none() {
                        warn!("ignoring unknown load mode {mode}");
                    }
                } else {
                    warn!("ignoring unknown argument {arg}");
                }
            }
        }
    }
    cli
}

pub fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(Vec::new(), env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grouping_mode(), GroupingMode::Trust);
    }

    #[test]
    fn env_overrides_defaults() {
        let config = Config::from_sources(
            Vec::new(),
            env_from(&[
                ("PORT", "9000"),
                ("CORELEX_DATA_DIR", "/srv/corelex"),
                ("CORELEX_LOAD_MODE", "Owned"),
                ("CORELEX_STRICT_ORDERING", "True"),
                ("RATE_LIMIT_RPS", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/corelex"));
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert_eq!(config.grouping_mode(), GroupingMode::Validate);
        assert_eq!(config.rate_limit_rps, DEFAULT_RATE_LIMIT_RPS);
    }

    #[test]
    fn cli_overrides_env() {
        let config = Config::from_sources(
            args(&["--data-dir", "/cli", "--load-mode=owned", "--no-cache"]),
            env_from(&[("CORELEX_DATA_DIR", "/env"), ("CORELEX_LOAD_MODE", "mmap")]),
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/cli"));
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert!(config.disable_cache);
        assert_eq!(config.db_config(), DbConfig::new("/cli", LoadMode::Owned));
    }

    #[test]
    fn file_sits_below_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corelex.toml");
        std::fs::write(
            &path,
            "# corelex browser\nhost = \"127.0.0.1\"\nport = 8181\ndata_dir = \"/file\"\n\
             strict_ordering = true\nrate_limit_burst = 3\nbogus = 1\n",
        )
        .unwrap();
        let flag = format!("--config={}", path.display());
        let config =
            Config::from_sources(args(&[flag.as_str()]), env_from(&[("PORT", "9001")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9001);
        assert_eq!(config.data_dir, PathBuf::from("/file"));
        assert!(config.strict_ordering);
        assert_eq!(config.rate_limit_burst, 3);
    }

    #[test]
    fn config_path_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corelex.toml");
        std::fs::write(&path, "load_mode = \"owned\"\ndisable_cache = true\n").unwrap();
        let path_str = path.display().to_string();
        let config = Config::from_sources(
            Vec::new(),
            env_from(&[("CORELEX_CONFIG", path_str.as_str())]),
        )
        .unwrap();
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert!(config.disable_cache);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Config::from_sources(
            args(&["--config", "/nonexistent/corelex.toml"]),
            env_from(&[]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("read config file"));
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corelex.toml");
        std::fs::write(&path, "port = \"eighty\"\n").unwrap();
        let flag = format!("--config={}", path.display());
        let err = Config::from_sources(args(&[flag.as_str()]), env_from(&[])).unwrap_err();
        assert!(err.to_string().contains("parse config file"));
    }

    #[test]
    fn bad_file_values_keep_previous_setting() {
        let file: FileConfig =
            toml::from_str("load_mode = \"floppy\"\nrate_limit_rps = 0\nunknown = \"x\"\n")
                .unwrap();
        assert!(file.extra.contains_key("unknown"));
        let mut config = Config::default();
        config.apply_file_config(file);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_load_mode_flag_is_ignored() {
        let config = Config::from_sources(
            args(&["--load-mode=floppy"]),
            env_from(&[("CORELEX_LOAD_MODE", "owned")]),
        )
        .unwrap();
        assert_eq!(config.load_mode, LoadMode::Owned);
    }
}
