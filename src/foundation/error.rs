/// Convenience result type used across ogcard.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by card APIs.
///
/// Input coercion never produces an error: malformed or missing values fall back to the
/// defaults table. The variants below are the failures that callers can observe.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Precondition violations on user-provided card data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Logo fetch or decode failures.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while painting a layout or encoding the raster.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while capturing a live node into a raster.
    #[error("capture error: {0}")]
    Capture(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
