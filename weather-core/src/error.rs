use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("`{0}` is a known field and can't be an additional property")]
    ReservedKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the process-wide icon manager is already installed")]
    IconManagerInstalled,
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
