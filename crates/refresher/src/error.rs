use thiserror::Error;

/// Errors raised while building a controller configuration
///
/// Runtime signal handling never fails; invalid input is rejected here,
/// before a controller exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("control height must be finite and positive, got {0}")]
    InvalidHeight(f32),

    #[error("exhausted view extent must be finite, got {0}")]
    InvalidExtent(f32),

    #[error("invalid tuning: {0}")]
    Toml(#[from] toml::de::Error),
}
