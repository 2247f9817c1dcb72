use thiserror::Error;

/// Deployment mistakes detected while authorizing a request.
///
/// These are never turned into an access failure: they propagate to the host,
/// which answers with a server error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("create authorization handler '{name}': {reason}")]
    CreateHandler { name: String, reason: String },

    #[error("authorization handler '{0}' is not registered")]
    UnknownHandler(String),

    #[error("no default authorization handler is registered")]
    NoDefaultHandler,

    #[error("default authorization handler is already registered")]
    DefaultHandlerAlreadySet,

    #[error("dynamic resource '{0}' is guarded but the handler provides no dynamic resource handler")]
    MissingDynamicResourceHandler(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
