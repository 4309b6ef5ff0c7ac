use crate::store::STORE_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Overrides the data directory when set and non-empty.
pub const DATA_DIR_ENV: &str = "CASE_LEDGER_DATA_DIR";

const APP_DIR_NAME: &str = "be-a-real-lawyer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    pub data_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: None,
        }
    }
}

impl LedgerConfig {
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_dir: None,
        }
    }

    pub fn from_env() -> Self {
        Self::with_override(std::env::var_os(DATA_DIR_ENV))
    }

    fn with_override(data_dir: Option<OsString>) -> Self {
        match data_dir.filter(|value| !value.is_empty()) {
            Some(dir) => Self::in_dir(dir),
            None => Self::default(),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}

/// Per-user application data directory, or `./data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| Path::new("data").to_path_buf())
}
