use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{Counts, Oracle, OracleError};

/// Replays a fixed sequence of target hit counts, padding the remainder of
/// the shots onto a filler pattern. The last entry repeats once exhausted.
pub struct ScriptedOracle {
    hits: Mutex<VecDeque<u64>>,
    last: Mutex<u64>,
    calls: Mutex<u64>,
}

impl ScriptedOracle {
    pub fn new(hits: &[u64]) -> Self {
        Self {
            hits: Mutex::new(hits.iter().copied().collect()),
            last: Mutex::new(hits.last().copied().unwrap_or(0)),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        *self.calls.lock().unwrap()
    }
}

impl Oracle for ScriptedOracle {
    fn query(&self, challenge: &str, shots: u32) -> Result<Counts, OracleError> {
        *self.calls.lock().unwrap() += 1;
        let hit = {
            let mut queue = self.hits.lock().unwrap();
            match queue.pop_front() {
                Some(h) => {
                    *self.last.lock().unwrap() = h;
                    h
                }
                None => *self.last.lock().unwrap(),
            }
        };
        let hit = hit.min(u64::from(shots));

        let target: String = challenge.chars().rev().collect();
        let filler: String = target
            .chars()
            .map(|c| if c == '0' { '1' } else { '0' })
            .collect();

        let mut counts = Counts::new();
        if hit > 0 {
            counts.insert(target, hit);
        }
        let rest = u64::from(shots) - hit;
        if rest > 0 {
            counts.insert(filler, rest);
        }
        Ok(counts)
    }
}

/// Always unreachable.
pub struct OfflineOracle;

impl Oracle for OfflineOracle {
    fn query(&self, _challenge: &str, _shots: u32) -> Result<Counts, OracleError> {
        Err(OracleError::Unavailable("backend offline".into()))
    }
}

/// Sleeps before every query, then answers like the wrapped script.
pub struct SlowOracle {
    pub delay: Duration,
    pub inner: ScriptedOracle,
}

impl Oracle for SlowOracle {
    fn query(&self, challenge: &str, shots: u32) -> Result<Counts, OracleError> {
        std::thread::sleep(self.delay);
        self.inner.query(challenge, shots)
    }
}
