//! Icon token resolution.
//!
//! OpenWeatherMap identifies its icons by short tokens such as `10d`
//! (rain, day). The mirror shows local image files instead, so every
//! token is translated into a path before it is stored on a record.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use crate::{config::IconConfig, error::WeatherError};

/// Maps an icon token to a displayable icon path.
pub trait IconResolver: Send + Sync {
    fn path_for_id(&self, token: &str) -> String;
}

impl<F> IconResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn path_for_id(&self, token: &str) -> String {
        self(token)
    }
}

/// Icon tokens published by OpenWeatherMap and the file name each one uses.
const OWM_ICONS: &[(&str, &str)] = &[
    ("01d", "clear-day"),
    ("01n", "clear-night"),
    ("02d", "partly-cloudy-day"),
    ("02n", "partly-cloudy-night"),
    ("03d", "cloudy"),
    ("03n", "cloudy"),
    ("04d", "overcast"),
    ("04n", "overcast"),
    ("09d", "showers"),
    ("09n", "showers"),
    ("10d", "rain-day"),
    ("10n", "rain-night"),
    ("11d", "thunderstorm"),
    ("11n", "thunderstorm"),
    ("13d", "snow"),
    ("13n", "snow"),
    ("50d", "mist"),
    ("50n", "mist"),
];

static INSTANCE: OnceLock<IconManager> = OnceLock::new();

/// Table-driven resolver for OpenWeatherMap icon tokens.
#[derive(Debug, Clone)]
pub struct IconManager {
    by_token: HashMap<String, String>,
    known_paths: HashSet<String>,
    fallback: String,
}

impl IconManager {
    pub fn new(config: &IconConfig) -> Self {
        let path = |name: &str| format!("{}/{}.{}", config.dir, name, config.extension);

        let mut by_token: HashMap<String, String> = OWM_ICONS
            .iter()
            .map(|(token, name)| ((*token).to_string(), path(name)))
            .collect();
        for (token, overridden) in &config.overrides {
            // a path that is also a token would resolve differently a second time
            if by_token.contains_key(overridden) || config.overrides.contains_key(overridden) {
                tracing::warn!(
                    token = %token,
                    path = %overridden,
                    "ignoring icon override that names a token"
                );
                continue;
            }
            by_token.insert(token.clone(), overridden.clone());
        }

        let fallback = path(&config.fallback);

        let mut known_paths: HashSet<String> = by_token.values().cloned().collect();
        known_paths.insert(fallback.clone());

        Self { by_token, known_paths, fallback }
    }

    /// Install `manager` as the process-wide instance.
    ///
    /// Fails if an instance was already installed or [`IconManager::instance`]
    /// already handed out the default one.
    pub fn install(manager: IconManager) -> Result<&'static IconManager, WeatherError> {
        INSTANCE.set(manager).map_err(|_| WeatherError::IconManagerInstalled)?;
        tracing::debug!("installed process-wide icon manager");
        Ok(Self::instance())
    }

    /// The process-wide instance, falling back to the default configuration.
    pub fn instance() -> &'static IconManager {
        INSTANCE.get_or_init(IconManager::default)
    }

    pub fn fallback_path(&self) -> &str {
        &self.fallback
    }

    /// Whether `path` is one this manager can produce.
    pub fn is_known_path(&self, path: &str) -> bool {
        self.known_paths.contains(path)
    }
}

impl Default for IconManager {
    fn default() -> Self {
        Self::new(&IconConfig::default())
    }
}

impl IconResolver for IconManager {
    fn path_for_id(&self, token: &str) -> String {
        if let Some(path) = self.by_token.get(token) {
            return path.clone();
        }
        // already resolved, e.g. a record read back from our own output
        if self.known_paths.contains(token) {
            return token.to_string();
        }
        tracing::debug!(token, fallback = %self.fallback, "unknown icon token");
        self.fallback.clone()
    }
}
