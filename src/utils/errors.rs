use thiserror::Error;

/// Unified error type for the tracker periphery (config, CLI, simulation).
/// The tracker core itself is total and never returns an error.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Simulation error: {0}")]
    SimulationError(String),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, TrackerError>;
