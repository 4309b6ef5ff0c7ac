use crate::timestamp::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Status given to a case nobody has picked up yet.
pub const DEFAULT_STATUS: &str = "等待接手";

/// Board columns, in display order.
pub const STATUSES: [&str; 4] = ["等待接手", "正在处理", "已交付", "已结案"];

pub fn is_known_status(status: &str) -> bool {
    STATUSES.contains(&status)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLink {
    pub path: String,
    pub name: String,
    pub extension: String,
    pub is_folder: bool,
}

impl FileLink {
    /// Builds a link from a picker result. Existence is not checked.
    pub fn from_selection(path: impl AsRef<Path>, is_folder: bool) -> Self {
        let path = path.as_ref();
        let display = path.to_string_lossy().to_string();
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().to_string())
            .unwrap_or_else(|| display.clone());
        let extension = if is_folder {
            String::new()
        } else {
            path.extension()
                .map(|value| format!(".{}", value.to_string_lossy()))
                .unwrap_or_default()
        };

        Self {
            path: display,
            name,
            extension,
            is_folder,
        }
    }
}

/// One legal case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client: String,
    pub opponent: String,
    pub lawyer: String,
    pub status: String,
    pub stage: String,
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<FileLink>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub sort_order: i64,
}

impl Project {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fills the fields every stored record must carry. Safe to call repeatedly;
    /// only `updated_at` moves on each call.
    pub fn ensure_defaults(&mut self) {
        if self.status.trim().is_empty() {
            self.status = DEFAULT_STATUS.to_string();
        }
        let now = Timestamp::now();
        if self.created_at.is_unset() {
            self.created_at = now;
        }
        self.updated_at = now;
    }

    pub fn same_identity(&self, other: &Project) -> bool {
        self.id == other.id
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
