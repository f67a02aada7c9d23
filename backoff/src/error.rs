use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("min delay {min:?} exceeds max delay {max:?}")]
    MinExceedsMax {
        min: std::time::Duration,
        max: std::time::Duration,
    },

    /// Factor must be finite and strictly positive.
    #[error("invalid factor {0}: must be finite and > 0")]
    InvalidFactor(f64),

    #[error("invalid duration {0:?}: expected a number followed by ns, us, ms, s, m or h")]
    InvalidDuration(String),

    #[error("invalid value {value:?} for env {var}")]
    InvalidEnv { var: &'static str, value: String },
}
