use thiserror::Error;

/// Error raised while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configuration names a backend this build does not include.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    /// A value is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
