use thiserror::Error;

/// Errors raised while building or loading a worker pool [`Config`](super::Config).
#[derive(Debug, Error)]
pub enum ParallelError {
    /// A builder field without a default was left unset.
    #[error("config field `{0}` was not set")]
    UninitializedField(&'static str),

    /// An environment variable held a value that is not a worker count.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl From<derive_builder::UninitializedFieldError> for ParallelError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        ParallelError::UninitializedField(err.field_name())
    }
}
