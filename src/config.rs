use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::NaiveTime;
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    parse_time, write_json_atomic, BoardError, Filter, NoteColor, Result, SortMode,
    DEFAULT_MAX_HISTORY,
};

const NOTES_FILE: &str = "notes.json";
const HISTORY_FILE: &str = "history.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding notes.json and history.json
    pub data_dir: PathBuf,

    /// Maximum number of undo/redo entries to keep
    pub max_history: usize,

    /// Filter used by `list` when none is given
    pub default_filter: Filter,

    /// Sort used by `list` when none is given
    pub default_sort: SortMode,

    /// Color given to new notes when none is chosen
    pub default_color: NoteColor,

    /// Whether the reminder watcher may run
    pub reminders_enabled: bool,

    /// How often to check for due notes (in seconds)
    pub reminder_interval_secs: u64,

    /// Reminder time (HH:MM) for notes that have a date but no time
    pub default_reminder_time: String,

    /// Whether to keep undo/redo history between runs
    pub persist_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_history: DEFAULT_MAX_HISTORY,
            default_filter: Filter::Today,
            default_sort: SortMode::DateDesc,
            default_color: NoteColor::Yellow,
            reminders_enabled: false,
            reminder_interval_secs: 60,
            default_reminder_time: "09:00".to_string(),
            persist_history: true,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "kbboard")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".kbboard"))
}

/// Platform location of the configuration file
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.json"))
        .unwrap_or_else(|| PathBuf::from(".kbboard").join("config.json"))
}

impl Config {
    /// Loads the configuration at `path`, falling back to defaults when the
    /// file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load` but skips validation, so a broken setting can be repaired
    /// with `set`
    pub fn load_unvalidated(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(BoardError::Io(e)),
        };

        let config: Config = serde_json::from_str(&content).map_err(|e| BoardError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving configuration to {}", path.display());
        write_json_atomic(path, self)
    }

    pub fn notes_file(&self) -> PathBuf {
        self.data_dir.join(NOTES_FILE)
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn reminder_time(&self) -> Result<NaiveTime> {
        parse_time(&self.default_reminder_time)
    }

    /// Rejects settings that would leave the application unusable
    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(BoardError::ConfigError {
                message: "max_history must be at least 1".to_string(),
            });
        }
        if self.reminder_interval_secs == 0 {
            return Err(BoardError::ConfigError {
                message: "reminder_interval_secs must be at least 1".to_string(),
            });
        }
        self.reminder_time().map_err(|e| BoardError::ConfigError {
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Applies a `key=value` setting
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| BoardError::ConfigError {
                message: format!("Expected key=value, got '{}'", assignment),
            })?;

        let config_err = |e: &dyn std::fmt::Display| BoardError::ConfigError {
            message: format!("Invalid value '{}' for {}: {}", value, key, e),
        };

        let mut updated = self.clone();
        match key {
            "data_dir" => updated.data_dir = PathBuf::from(value),
            "max_history" => updated.max_history = value.parse().map_err(|e| config_err(&e))?,
            "default_filter" => updated.default_filter = value.parse().map_err(|e| config_err(&e))?,
            "default_sort" => updated.default_sort = value.parse().map_err(|e| config_err(&e))?,
            "default_color" => updated.default_color = value.parse().map_err(|e| config_err(&e))?,
            "reminders_enabled" => {
                updated.reminders_enabled = value.parse().map_err(|e| config_err(&e))?
            }
            "reminder_interval_secs" => {
                updated.reminder_interval_secs = value.parse().map_err(|e| config_err(&e))?
            }
            "default_reminder_time" => {
                let time = parse_time(value).map_err(|e| config_err(&e))?;
                updated.default_reminder_time = time.format("%H:%M").to_string();
            }
            "persist_history" => updated.persist_history = value.parse().map_err(|e| config_err(&e))?,
            other => {
                return Err(BoardError::ConfigError {
                    message: format!("Unknown setting '{}'", other),
                })
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
