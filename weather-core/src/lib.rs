//! Core library for the smart-mirror weather display.
//!
//! This crate defines:
//! - The weather condition record and its JSON mapping
//! - Icon token resolution
//! - Configuration handling
//!
//! It is used by `mirror-weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod details;
pub mod error;
pub mod fields;
pub mod icon;
pub mod model;

pub use config::{Config, IconConfig};
pub use details::{AdditionalProperties, WeatherDetails, WeatherDetailsBuilder, WeatherDetailsSeed};
pub use error::WeatherError;
pub use icon::{IconManager, IconResolver};
pub use model::WeatherSnapshot;
