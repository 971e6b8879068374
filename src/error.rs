use thiserror::Error;

/// Failures reported by an oracle backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// The backend could not be reached or refused the job.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The challenge contains something other than '0'/'1'.
    #[error("invalid challenge {0:?}: expected a bit-string")]
    InvalidChallenge(String),

    /// The challenge is empty or wider than the backend can simulate.
    #[error("unsupported challenge width {width} (max {max})")]
    UnsupportedWidth { width: usize, max: usize },

    /// The simulator could not build its sampling distribution.
    #[error("simulation fault: {0}")]
    Simulation(String),

    /// The returned distribution does not account for every shot.
    #[error("malformed oracle result: expected {expected} shots, got {actual}")]
    MalformedResult { expected: u64, actual: u64 },
}

/// Reasons a block could not be admitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdmissionError {
    /// The oracle failed on the `iterations`-th query.
    #[error("admission aborted after {iterations} iterations: {source}")]
    OracleUnavailable {
        #[source]
        source: OracleError,
        iterations: u64,
    },

    /// The iteration or wall-clock cap was hit before the threshold was met.
    #[error("admission timed out after {iterations} iterations ({elapsed_ms} ms)")]
    Timeout { iterations: u64, elapsed_ms: u64 },

    #[error("invalid admission policy: {0}")]
    InvalidPolicy(String),
}

impl AdmissionError {
    /// Oracle queries spent before the admission gave up.
    pub fn iterations(&self) -> u64 {
        match self {
            AdmissionError::OracleUnavailable { iterations, .. }
            | AdmissionError::Timeout { iterations, .. } => *iterations,
            AdmissionError::InvalidPolicy(_) => 0,
        }
    }
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown backend {0:?} (expected simulator|1|hardware|2)")]
    UnknownBackend(String),

    #[error(transparent)]
    Policy(#[from] AdmissionError),
}
