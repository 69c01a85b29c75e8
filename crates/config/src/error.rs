use thiserror::Error;

/// Failure to interpolate a single config value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
    /// The value under `key` is not a string.
    #[error("config value for {key:?} is a {kind}, expected a string")]
    NonStringValue { key: String, kind: &'static str },
}

pub type Result<T, E = InterpolationError> = std::result::Result<T, E>;
