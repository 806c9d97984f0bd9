use thiserror::Error;

/// Fatal, startup-or-abort level errors.
///
/// Per-operation backend failures never produce a `DriverError` — they stay
/// inside [`crate::BackendStatus`] and are reported as data. This enum covers
/// only the conditions that make continuing the run meaningless.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("backend '{0}' not found")]
    BackendNotFound(String),

    #[error("backend initialization failed: {0}")]
    BackendInitFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("--start-index > 0 is incompatible with --run-precreate")]
    ResumeIncompatibleWithPrecreate,

    #[error("prepare_global failed on rank 0")]
    PrepareGlobalFailed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
