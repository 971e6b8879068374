pub mod grover;

#[cfg(test)]
pub mod testing;

use std::collections::BTreeMap;

pub use crate::error::OracleError;
pub use grover::{GroverSimulator, MAX_QUBITS};

/// Observed frequency of every output bit-string over one batch of shots.
pub type Counts = BTreeMap<String, u64>;

/// External probabilistic scoring backend.
///
/// Given a bit-string challenge, runs `shots` trials and returns how often each
/// output pattern (same width as the challenge) was observed. Counts always sum
/// to `shots`. Repeated calls with the same challenge may return different counts.
pub trait Oracle: Send + Sync {
    fn query(&self, challenge: &str, shots: u32) -> Result<Counts, OracleError>;
}

/// Check that every shot is accounted for.
pub fn check_counts(counts: &Counts, shots: u32) -> Result<(), OracleError> {
    let total: u64 = counts.values().sum();
    if total != u64::from(shots) {
        return Err(OracleError::MalformedResult {
            expected: u64::from(shots),
            actual: total,
        });
    }
    Ok(())
}
