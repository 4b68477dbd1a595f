use thiserror::Error;

/// Errors raised by the clock controller and its collaborators
#[derive(Debug, Error)]
pub enum ClockError {
    /// The start form carried a budget that is not a positive number of minutes
    #[error("invalid time budget: {0:?}")]
    InvalidBudget(String),

    /// A URL parameter named a side that does not exist
    #[error("unknown side: {0:?}")]
    UnknownSide(String),

    /// The page is missing an element the clock cannot work without
    #[error("missing element with id {0:?}")]
    MissingElement(&'static str),

    /// A browser API call failed
    #[error("browser call failed: {0}")]
    Js(String),

    #[error("failed to serialize clock state: {0}")]
    Serialize(#[from] serde_json::Error),
}
