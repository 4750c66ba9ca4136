use thiserror::Error;

/// Errors that can occur while zeroing or solving a trajectory.
#[derive(Debug, Error)]
pub enum BallisticsError {
    /// An input is outside its physical domain, e.g. a non-positive BC.
    #[error("invalid input: {parameter} = {value}")]
    InvalidInput { parameter: &'static str, value: f64 },

    /// The zero-angle search ran out of iterations or could not bracket a root.
    #[error("zero angle did not converge after {iterations} iterations (miss {miss_inches:.4} in)")]
    NoConvergence { iterations: usize, miss_inches: f64 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// A load profile could not be read or parsed.
    #[error("failed to load profile")]
    Profile(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BallisticsError {
    pub(crate) fn invalid(parameter: &'static str, value: f64) -> Self {
        BallisticsError::InvalidInput { parameter, value }
    }
}

impl From<std::io::Error> for BallisticsError {
    fn from(err: std::io::Error) -> Self {
        BallisticsError::Profile(Box::new(err))
    }
}

impl From<serde_json::Error> for BallisticsError {
    fn from(err: serde_json::Error) -> Self {
        BallisticsError::Profile(Box::new(err))
    }
}
