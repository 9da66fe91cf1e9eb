use thiserror::Error;

/// Everything that can stop a single invocation or the module bootstrap.
/// The display text is what ends up in the `error` field shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// A required host capability is missing.
    #[error("{0}")]
    Configuration(String),
    /// The builder answered with something other than a JSON object.
    #[error("request builder returned an invalid response shape")]
    Format,
    /// The builder reported a domain error through its `error` field.
    #[error("{0}")]
    Builder(String),
    /// Non-success status, an `error` field in the body, or a transport failure.
    #[error("{0}")]
    Remote(String),
    #[error("{0}")]
    Bootstrap(String),
}

impl CallError {
    pub fn builder_unavailable() -> Self {
        Self::Configuration("request builder unavailable".to_string())
    }

    pub fn cancelled() -> Self {
        Self::Remote("call cancelled before a response arrived".to_string())
    }

    pub fn loader_unavailable() -> Self {
        Self::Configuration("module loader unavailable".to_string())
    }
}
