use log::{info, trace};
use serde::Serialize;
use std::time::{Duration, Instant};

use super::nonce::target_pattern;
use crate::error::{AdmissionError, OracleError};
use crate::oracle::{MAX_QUBITS, Oracle};

/// Parameters that gate admission of a block.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionPolicy {
    /// Minimum target frequency (percent) required to commit.
    pub threshold: f64,
    /// Trials per oracle query.
    pub shots: u32,
    /// Width of the derived nonce in bits.
    pub nonce_width: usize,
    /// Give up after this many oracle queries.
    pub max_iterations: Option<u64>,
    /// Give up once this much wall-clock time has passed.
    #[serde(skip)]
    pub max_duration: Option<Duration>,
}

impl AdmissionPolicy {
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(AdmissionError::InvalidPolicy(format!(
                "threshold must be a non-negative percentage, got {}",
                self.threshold
            )));
        }
        if self.shots == 0 {
            return Err(AdmissionError::InvalidPolicy("shots must be > 0".into()));
        }
        if self.max_duration == Some(Duration::ZERO) {
            return Err(AdmissionError::InvalidPolicy(
                "max duration must be > 0 (leave it unset to disable)".into(),
            ));
        }
        if self.nonce_width == 0 || self.nonce_width > MAX_QUBITS {
            return Err(AdmissionError::InvalidPolicy(format!(
                "nonce width must be within 1..={MAX_QUBITS}, got {}",
                self.nonce_width
            )));
        }
        Ok(())
    }
}

/// Statistics of a completed admission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionReport {
    pub final_accuracy: f64,
    pub iterations: u64,
    pub average_accuracy: f64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionState {
    /// About to query the oracle (or to stop if a cap is hit).
    Querying,
    /// Oracle answered; `hits` is the target pattern's count.
    Accumulating { hits: u64 },
    Admitted,
    TimedOut,
    Failed(OracleError),
}

/// Retry loop against a stationary oracle. The challenge never changes
/// between iterations; only the random draw does.
pub struct Admission<'a> {
    oracle: &'a dyn Oracle,
    policy: &'a AdmissionPolicy,
    nonce: &'a str,
    target: String,
    state: AdmissionState,
    iterations: u64,
    accuracy: f64,
    running_sum: f64,
    started: Instant,
}

impl<'a> Admission<'a> {
    pub fn new(oracle: &'a dyn Oracle, nonce: &'a str, policy: &'a AdmissionPolicy) -> Self {
        // A zero threshold is met before any query is made.
        let state = if policy.threshold <= 0.0 {
            AdmissionState::Admitted
        } else {
            AdmissionState::Querying
        };
        Self {
            oracle,
            policy,
            nonce,
            target: target_pattern(nonce),
            state,
            iterations: 0,
            accuracy: 0.0,
            running_sum: 0.0,
            started: Instant::now(),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AdmissionState::Admitted | AdmissionState::TimedOut | AdmissionState::Failed(_)
        )
    }

    fn cap_reached(&self) -> bool {
        if let Some(max) = self.policy.max_iterations {
            if self.iterations >= max {
                return true;
            }
        }
        if let Some(limit) = self.policy.max_duration {
            if self.started.elapsed() >= limit {
                return true;
            }
        }
        false
    }

    /// Advance one transition. Terminal states are left unchanged.
    pub fn step(&mut self) -> &AdmissionState {
        let next = match &self.state {
            AdmissionState::Querying => {
                if self.cap_reached() {
                    AdmissionState::TimedOut
                } else {
                    self.iterations += 1;
                    match self.oracle.query(self.nonce, self.policy.shots) {
                        Ok(counts) => AdmissionState::Accumulating {
                            hits: counts.get(&self.target).copied().unwrap_or(0),
                        },
                        Err(e) => AdmissionState::Failed(e),
                    }
                }
            }
            AdmissionState::Accumulating { hits } => {
                self.accuracy = (*hits as f64 / f64::from(self.policy.shots)) * 100.0;
                self.running_sum += self.accuracy;
                if self.accuracy >= self.policy.threshold {
                    AdmissionState::Admitted
                } else {
                    AdmissionState::Querying
                }
            }
            terminal => terminal.clone(),
        };
        trace!(
            "ADMISSION nonce={} iter={} {:?} -> {:?}",
            self.nonce, self.iterations, self.state, next
        );
        self.state = next;
        &self.state
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Drive the machine to a terminal state.
    pub fn run(mut self) -> Result<AdmissionReport, AdmissionError> {
        while !self.is_terminal() {
            self.step();
        }

        let elapsed_ms = self.elapsed_ms();
        match self.state {
            AdmissionState::Admitted => {
                let average_accuracy = if self.iterations == 0 {
                    0.0
                } else {
                    self.running_sum / self.iterations as f64
                };
                Ok(AdmissionReport {
                    final_accuracy: self.accuracy,
                    iterations: self.iterations,
                    average_accuracy,
                    elapsed_ms,
                })
            }
            AdmissionState::TimedOut => Err(AdmissionError::Timeout {
                iterations: self.iterations,
                elapsed_ms,
            }),
            AdmissionState::Failed(source) => Err(AdmissionError::OracleUnavailable {
                source,
                iterations: self.iterations,
            }),
            AdmissionState::Querying | AdmissionState::Accumulating { .. } => {
                unreachable!("loop exits only on terminal states")
            }
        }
    }
}

/// Query `oracle` with the fixed `nonce` until the reversed-nonce frequency
/// reaches `policy.threshold`, then report the accumulated statistics.
pub fn admit(
    oracle: &dyn Oracle,
    nonce: &str,
    policy: &AdmissionPolicy,
) -> Result<AdmissionReport, AdmissionError> {
    policy.validate()?;
    let report = Admission::new(oracle, nonce, policy).run()?;
    info!(
        "Final Accuracy: {}% | Iterations: {} | Average Accuracy: {}%",
        report.final_accuracy, report.iterations, report.average_accuracy
    );
    Ok(report)
}
