use thiserror::Error;

/// Failure reported by a stepping backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the rollout environment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("history entry {index} has no successor")]
    NoSuccessor { index: usize },

    #[error("backend clock did not advance after history entry {index}: elapsed {elapsed}")]
    NonPositiveElapsed { index: usize, elapsed: f64 },
}

pub type EnvResult<T> = Result<T, EnvError>;
