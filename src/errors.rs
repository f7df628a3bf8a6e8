use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(String),

    #[error("checkout provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("checkout provider returned an unusable record: {0}")]
    MalformedRecord(String),

    #[error("failed to store checkout {id}: {reason}")]
    Store { id: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}
