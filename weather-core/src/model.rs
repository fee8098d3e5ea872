use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::details::WeatherDetails;

/// The part of an OpenWeatherMap "current weather" response that owns the
/// condition records. Everything else in the response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Observation time, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,

    #[serde(default)]
    pub weather: Vec<WeatherDetails>,
}

impl WeatherSnapshot {
    /// The condition OpenWeatherMap lists first, which it treats as primary.
    pub fn primary(&self) -> Option<&WeatherDetails> {
        self.weather.first()
    }

    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{IconManager, IconResolver};

    const CURRENT: &str = r#"{
        "coord": {"lon": 14.29, "lat": 48.31},
        "weather": [
            {"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"},
            {"id": 701, "main": "Mist", "description": "mist", "icon": "50d"}
        ],
        "main": {"temp": 12.4, "humidity": 87},
        "dt": 1700000000,
        "name": "Linz"
    }"#;

    #[test]
    fn parses_conditions_from_a_current_weather_response() {
        let snapshot: WeatherSnapshot = serde_json::from_str(CURRENT).expect("must parse");

        assert_eq!(snapshot.name.as_deref(), Some("Linz"));
        assert_eq!(snapshot.weather.len(), 2);

        let primary = snapshot.primary().expect("has a primary condition");
        assert_eq!(primary.id(), Some(501));
        assert_eq!(primary.weather_summary(), "Rain");
        assert_eq!(primary.icon_path(), IconManager::instance().path_for_id("10d"));
    }

    #[test]
    fn observation_time_from_unix_seconds() {
        let snapshot: WeatherSnapshot = serde_json::from_str(CURRENT).expect("must parse");
        let at = snapshot.observation_time().expect("dt is set");
        assert_eq!(at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let snapshot: WeatherSnapshot = serde_json::from_str("{}").expect("must parse");
        assert!(snapshot.primary().is_none());
        assert!(snapshot.observation_time().is_none());
    }

    #[test]
    fn a_broken_condition_fails_the_whole_snapshot() {
        let err = serde_json::from_str::<WeatherSnapshot>(
            r#"{"weather": [{"main": "Rain", "icon": "10d"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `weatherDescription`"));
    }

    #[test]
    fn roundtrip_keeps_conditions_equal() {
        let snapshot: WeatherSnapshot = serde_json::from_str(CURRENT).expect("must parse");
        let text = serde_json::to_string(&snapshot).expect("serialize");
        let back: WeatherSnapshot = serde_json::from_str(&text).expect("parse back");
        assert_eq!(back, snapshot);
    }
}
