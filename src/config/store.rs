use std::path::{Path, PathBuf};

use super::types::TestSettings;
use crate::error::{AppError, AppResult, ConfigError};

const MAX_NAME_LEN: usize = 64;
const EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Named presets stored as `<dir>/<name>.toml` (JSON is read as well).
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `settings` as TOML, creating the directory when needed.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid names or when the file cannot be written.
    pub fn save(&self, name: &str, settings: &TestSettings) -> AppResult<PathBuf> {
        validate_name(name)?;
        let path = self.dir.join(format!("{name}.toml"));
        let content = toml::to_string_pretty(settings)
            .map_err(|err| AppError::config(ConfigError::SerializeToml { source: err }))?;
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, content))
            .map_err(|err| {
                AppError::config(ConfigError::WritePreset {
                    path: path.clone(),
                    source: err,
                })
            })?;
        tracing::info!("Saved preset '{}' to {}", name, path.display());
        Ok(path)
    }

    /// # Errors
    ///
    /// Returns an error when the preset is missing, unreadable or invalid.
    pub fn load(&self, name: &str) -> AppResult<TestSettings> {
        validate_name(name)?;
        let path = self.existing_path(name).ok_or_else(|| {
            AppError::config(ConfigError::PresetNotFound {
                name: name.to_owned(),
                dir: self.dir.clone(),
            })
        })?;
        let settings = load_preset_file(&path)?;
        settings.check_bounds().map_err(AppError::config)?;
        tracing::debug!("Loaded preset '{}' from {}", name, path.display());
        Ok(settings)
    }

    /// Sorted preset names; a missing directory has no presets.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory exists but cannot be read.
    pub fn list(&self) -> AppResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AppError::config(ConfigError::ListPresets {
                    path: self.dir.clone(),
                    source: err,
                }));
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| EXTENSIONS.contains(&ext))
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_owned)
            })
            .filter(|name| validate_name(name).is_ok())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Removes every stored format of the preset.
    ///
    /// # Errors
    ///
    /// Returns an error when the preset does not exist or cannot be removed.
    pub fn delete(&self, name: &str) -> AppResult<()> {
        validate_name(name)?;
        let mut removed = false;
        for ext in EXTENSIONS {
            let path = self.dir.join(format!("{name}.{ext}"));
            if !path.is_file() {
                continue;
            }
            std::fs::remove_file(&path).map_err(|err| {
                AppError::config(ConfigError::DeletePreset {
                    path: path.clone(),
                    source: err,
                })
            })?;
            removed = true;
        }
        if !removed {
            return Err(AppError::config(ConfigError::PresetNotFound {
                name: name.to_owned(),
                dir: self.dir.clone(),
            }));
        }
        tracing::info!("Deleted preset '{}'", name);
        Ok(())
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.existing_path(name).is_some()
    }

    fn existing_path(&self, name: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPresetName {
            name: name.to_owned(),
        })
    }
}

pub(crate) fn load_preset_file(path: &Path) -> AppResult<TestSettings> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadPreset {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        return serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        });
    }
    toml::from_str(&content).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })
    })
}
