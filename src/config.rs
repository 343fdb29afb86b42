use crate::card::Operation;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Player-tunable settings that survive across runs: which operations the
/// deck draws from, and whether negative numbers may appear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub operations: Vec<Operation>,
    pub allow_negatives: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operations: Operation::ALL.to_vec(),
            allow_negatives: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "flashmath") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("flashmath_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-memory store for tests and one-off sessions that should not touch the
/// user's settings file.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    settings: RefCell<Option<Settings>>,
}

impl MemoryConfigStore {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(Some(settings)),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Settings {
        self.settings.borrow().clone().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        *self.settings.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings::default();
        store.save(&settings).unwrap();
        let loaded = store.load();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings {
            operations: vec![Operation::Multiplication, Operation::Division],
            allow_negatives: false,
        };
        store.save(&settings).unwrap();
        let loaded = store.load();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryConfigStore::default();
        let settings = Settings {
            operations: vec![Operation::Addition],
            allow_negatives: false,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }
}
