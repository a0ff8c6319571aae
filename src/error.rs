// Typed errors with thiserror. Only InsufficientBalance is user-visible;
// everything else is contained and logged so the session stays playable.

use thiserror::Error;

/// Errors surfaced by framework operations.
#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("insufficient balance: bet {bet} exceeds balance {balance}")]
    InsufficientBalance { bet: f64, balance: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure raised by a game plugin callback. Caught at the call site and
/// replaced with a built-in default behavior.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin call failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl PluginError {
    pub fn failed(message: impl Into<String>) -> Self {
        PluginError::Failed(message.into())
    }
}

/// Failure raised by a drawing surface adapter.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("drawing surface missing: {0}")]
    Missing(String),

    #[error("draw call failed: {0}")]
    Draw(String),
}

/// Failure constructing or probing a secondary render backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("enhanced backend unavailable: {0}")]
    Unavailable(String),

    #[error("unsupported backend version: {0}")]
    UnsupportedVersion(String),

    #[error("backend construction failed: {0}")]
    Construction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_names_amounts() {
        let err = FrameworkError::InsufficientBalance {
            bet: 10.0,
            balance: 5.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("5"));
    }

    #[test]
    fn surface_error_converts_to_plugin_error() {
        let err: PluginError = SurfaceError::Missing("canvas".to_string()).into();
        assert!(err.to_string().contains("canvas"));
    }
}
