use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

pub const DATA_DIR_VAR: &str = "MMPREDICT_DATA_DIR";
pub const SEED_VAR: &str = "MMPREDICT_SEED";
pub const LOG_VAR: &str = "MMPREDICT_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub data_dir: PathBuf,
    /// Fixed RNG seed for reproducible runs; entropy when unset.
    pub seed: Option<u64>,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(ncaa_bracket::store::DEFAULT_DATA_DIR),
            seed: None,
            log_level: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup. Blank or unparsable values fall
    /// back to the defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            data_dir: get(DATA_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            seed: get(SEED_VAR).and_then(|v| v.parse().ok()),
            log_level: get(LOG_VAR).and_then(|v| LevelFilter::from_str(&v).ok()),
        }
    }

    /// Command-line flags win over the environment. Each `-v` raises the level
    /// one step from Info.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, seed: Option<u64>, verbose: u8) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self.log_level = match verbose {
            0 => self.log_level,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        };
        self
    }
}
