use log::debug;
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_4;
use std::sync::{Arc, Mutex};

use super::{Counts, Oracle, OracleError, check_counts};

/// Largest register we are willing to simulate (2^20 amplitudes).
pub const MAX_QUBITS: usize = 20;

/// State-vector simulation of Grover search marking the challenge.
///
/// Qubit `i` of the marked basis state equals `challenge[i]`. Outcomes are
/// reported little-endian (qubit `n-1` printed first), so the marked state
/// shows up under the reversed challenge.
pub struct GroverSimulator {
    rng: Mutex<StdRng>,
    /// Ideal sampler for the most recent challenge. Admission retries the
    /// same challenge, so the state vector is evolved once per block.
    cache: Mutex<Option<(String, Arc<WeightedIndex<f64>>)>>,
    /// Probability that a shot is replaced by a uniformly random outcome.
    noise: f64,
}

impl GroverSimulator {
    pub fn new(seed: Option<u64>, noise: f64) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            cache: Mutex::new(None),
            noise: noise.clamp(0.0, 1.0),
        }
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Basis index whose qubit `i` is bit `i` of the challenge.
    fn marked_index(challenge: &str) -> Result<usize, OracleError> {
        challenge
            .bytes()
            .enumerate()
            .try_fold(0usize, |acc, (i, b)| match b {
                b'0' => Ok(acc),
                b'1' => Ok(acc | (1 << i)),
                _ => Err(OracleError::InvalidChallenge(challenge.to_string())),
            })
    }

    /// Measurement probabilities after the optimal number of Grover iterations.
    fn probabilities(width: usize, marked: usize) -> Vec<f64> {
        let size = 1usize << width;
        let mut amps = vec![1.0 / (size as f64).sqrt(); size];
        let rounds = ((FRAC_PI_4 * (size as f64).sqrt()).floor() as usize).max(1);

        for _ in 0..rounds {
            // oracle: phase flip on the marked state
            amps[marked] = -amps[marked];
            // diffusion: inversion about the mean
            let mean = amps.iter().sum::<f64>() / size as f64;
            for a in amps.iter_mut() {
                *a = 2.0 * mean - *a;
            }
        }

        amps.into_iter().map(|a| a * a).collect()
    }

    fn sampler(probs: &[f64]) -> Result<WeightedIndex<f64>, OracleError> {
        WeightedIndex::new(probs)
            .map_err(|e| OracleError::Simulation(format!("bad distribution: {e}")))
    }

    /// Sampler for `challenge`, reusing the cached one when it matches.
    fn ideal_sampler(
        &self,
        challenge: &str,
        width: usize,
        marked: usize,
    ) -> Result<Arc<WeightedIndex<f64>>, OracleError> {
        let mut cache = self.cache.lock().expect("mutex poisoned");
        if let Some((cached, sampler)) = cache.as_ref() {
            if cached == challenge {
                return Ok(Arc::clone(sampler));
            }
        }
        let sampler = Arc::new(Self::sampler(&Self::probabilities(width, marked))?);
        *cache = Some((challenge.to_string(), Arc::clone(&sampler)));
        Ok(sampler)
    }
}

impl Oracle for GroverSimulator {
    fn query(&self, challenge: &str, shots: u32) -> Result<Counts, OracleError> {
        let width = challenge.len();
        if width == 0 || width > MAX_QUBITS {
            return Err(OracleError::UnsupportedWidth {
                width,
                max: MAX_QUBITS,
            });
        }
        let marked = Self::marked_index(challenge)?;
        let ideal = self.ideal_sampler(challenge, width, marked)?;
        let size = 1usize << width;
        let uniform = Uniform::new(0usize, size);

        let mut rng = self.rng.lock().expect("mutex poisoned");
        let mut hist = vec![0u64; size];
        for _ in 0..shots {
            let outcome = if self.noise > 0.0 && rng.gen_bool(self.noise) {
                uniform.sample(&mut *rng)
            } else {
                ideal.sample(&mut *rng)
            };
            hist[outcome] += 1;
        }
        drop(rng);

        let counts: Counts = hist
            .into_iter()
            .enumerate()
            .filter(|(_, n)| *n > 0)
            .map(|(idx, n)| (format!("{idx:0width$b}"), n))
            .collect();
        check_counts(&counts, shots)?;

        debug!(
            "GROVER challenge={} shots={} outcomes={} noise={}",
            challenge,
            shots,
            counts.len(),
            self.noise
        );
        Ok(counts)
    }
}
