use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::Text;
use mirror_weather_core::{
    Config, IconManager, IconResolver, WeatherDetails, WeatherSnapshot, fields::{Field, lookup},
};
use serde_json::{Map, Value};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "mirror-weather", version, about = "Smart-mirror weather records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure where icons are looked up.
    Configure,

    /// Print the icon path a token resolves to.
    Icon {
        /// Icon token, e.g. "10d".
        token: String,
    },

    /// Read weather JSON and print it normalized.
    Normalize {
        /// JSON file, or "-" for stdin.
        input: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// Print each weather condition in a readable form.
    Show {
        /// JSON file, or "-" for stdin.
        input: PathBuf,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Icon { token } => {
                install_icons(&config)?;
                println!("{}", IconManager::instance().path_for_id(&token));
            }
            Command::Normalize { input, pretty } => {
                install_icons(&config)?;
                let conditions = read_conditions(&input)?;
                let out = if pretty {
                    serde_json::to_string_pretty(&conditions)
                } else {
                    serde_json::to_string(&conditions)
                }
                .context("Failed to serialize weather conditions")?;
                println!("{out}");
            }
            Command::Show { input } => {
                install_icons(&config)?;
                for details in read_conditions(&input)? {
                    println!("{details}");
                }
            }
        }

        Ok(())
    }
}

fn install_icons(config: &Config) -> Result<()> {
    IconManager::install(IconManager::new(&config.icons))
        .context("Failed to set up icon resolution")?;
    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let dir = Text::new("Icon directory:")
        .with_default(&config.icons.dir)
        .prompt()
        .context("Failed to read icon directory")?;
    let extension = Text::new("Icon file extension:")
        .with_default(&config.icons.extension)
        .prompt()
        .context("Failed to read icon extension")?;
    let fallback = Text::new("Icon name for unknown tokens:")
        .with_default(&config.icons.fallback)
        .prompt()
        .context("Failed to read fallback icon")?;

    config.set_icon_dir(dir);
    config.icons.extension = extension.trim_start_matches('.').to_string();
    config.icons.fallback = fallback;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn read_conditions(input: &Path) -> Result<Vec<WeatherDetails>> {
    let conditions = parse_conditions(&read_input(input)?)?;
    tracing::debug!(count = conditions.len(), "read weather conditions");
    Ok(conditions)
}

/// Accepts a single condition, an array of them, or a response with a
/// `weather` array.
fn parse_conditions(text: &str) -> Result<Vec<WeatherDetails>> {
    let value: Value = serde_json::from_str(text).context("Input is not valid JSON")?;

    let response = matches!(&value, Value::Object(obj) if is_response(obj));

    let conditions: Vec<WeatherDetails> = match value {
        Value::Array(_) => serde_json::from_value(value).context("Invalid weather conditions")?,
        Value::Object(_) if response => {
            let snapshot: WeatherSnapshot =
                serde_json::from_value(value).context("Invalid weather response")?;
            snapshot.weather
        }
        Value::Object(_) => {
            vec![WeatherDetails::from_value(value).context("Invalid weather condition")?]
        }
        _ => bail!("Expected a JSON object or array"),
    };

    Ok(conditions)
}

/// A response carries a `weather` array and no string-valued condition
/// field. Responses have `id` and `main` too, but `main` is an object there.
/// Anything else is a single condition, `weather` then being an extra field.
fn is_response(obj: &Map<String, Value>) -> bool {
    let condition_field = |(key, value): (&String, &Value)| {
        matches!(lookup(key), Some(Field::Summary | Field::Description | Field::Icon))
            && value.is_string()
    };
    obj.get("weather").is_some_and(Value::is_array) && !obj.iter().any(condition_field)
}
