use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Where icon files live and how tokens map onto them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Directory prefix for every resolved icon path.
    pub dir: String,

    /// File extension without the leading dot, e.g. "svg".
    pub extension: String,

    /// Icon name used for tokens nobody knows about.
    pub fallback: String,

    /// Example TOML:
    /// [icons.overrides]
    /// 10d = "/srv/mirror/icons/umbrella.png"
    pub overrides: HashMap<String, String>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            dir: "icons".to_string(),
            extension: "svg".to_string(),
            fallback: "unknown".to_string(),
            overrides: HashMap::new(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub icons: IconConfig,
}

impl Config {
    /// Load the user's config, or the defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Cannot read {}", path.display()));
            }
        };

        Self::from_toml(&contents).with_context(|| format!("Bad config in {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Cannot encode configuration as TOML")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write the config to `path`, creating missing directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        fs::write(path, self.to_toml()?).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("at", "smart-mirror", "mirror-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_icon_dir(&mut self, dir: impl Into<String>) {
        self.icons.dir = dir.into();
    }

    /// Set or replace the path used for a single icon token.
    pub fn upsert_icon_override(&mut self, token: impl Into<String>, path: impl Into<String>) {
        self.icons.overrides.insert(token.into(), path.into());
    }

    pub fn icon_override(&self, token: &str) -> Option<&str> {
        self.icons.overrides.get(token).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = Config::from_toml("").expect("empty config must parse");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.icons.dir, "icons");
        assert_eq!(cfg.icons.extension, "svg");
    }

    #[test]
    fn partial_icon_section_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [icons]
            dir = "/srv/mirror/icons"

            [icons.overrides]
            10d = "/srv/mirror/icons/umbrella.png"
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.icons.dir, "/srv/mirror/icons");
        assert_eq!(cfg.icons.fallback, "unknown");
        assert_eq!(cfg.icon_override("10d"), Some("/srv/mirror/icons/umbrella.png"));
        assert_eq!(cfg.icon_override("01d"), None);
    }

    #[test]
    fn upsert_replaces_existing_override() {
        let mut cfg = Config::default();

        cfg.upsert_icon_override("01d", "a.png");
        cfg.upsert_icon_override("01d", "b.png");

        assert_eq!(cfg.icon_override("01d"), Some("b.png"));
        assert_eq!(cfg.icons.overrides.len(), 1);
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config::default();
        cfg.set_icon_dir("/opt/icons");
        cfg.upsert_icon_override("50n", "/opt/icons/fog.svg");

        let text = cfg.to_toml().expect("serialize");
        let back = Config::from_toml(&text).expect("parse back");

        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("mirror-weather-no-such-dir").join("config.toml");
        let cfg = Config::load_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("mirror-weather-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_icon_dir("/srv/mirror/icons");
        cfg.upsert_icon_override("13d", "/srv/mirror/icons/flake.png");

        cfg.save_to(&path).expect("save");
        let back = Config::load_from(&path).expect("load");
        fs::remove_dir_all(&dir).expect("cleanup");

        assert_eq!(back, cfg);
    }

    #[test]
    fn broken_file_names_its_path() {
        let dir = std::env::temp_dir().join(format!("mirror-weather-broken-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(&path, "icons = 3").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        fs::remove_dir_all(&dir).expect("cleanup");

        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Config::from_toml("[icons\ndir = 1").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration TOML"));
    }
}
