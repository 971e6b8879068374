use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{
    AdmissionPolicy, DEFAULT_MAX_ITERATIONS, DEFAULT_NONCE_WIDTH, DEFAULT_SHOTS, HARDWARE_NOISE,
    HARDWARE_THRESHOLD, SIMULATOR_THRESHOLD,
};
use crate::error::ConfigError;

/// Which threshold preset the operator selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Simulator,
    Hardware,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "simulator" | "sim" => Ok(Backend::Simulator),
            "2" | "hardware" | "hw" => Ok(Backend::Hardware),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl Backend {
    pub fn default_threshold(self) -> f64 {
        match self {
            Backend::Simulator => SIMULATOR_THRESHOLD,
            Backend::Hardware => HARDWARE_THRESHOLD,
        }
    }

    pub fn default_noise(self) -> f64 {
        match self {
            Backend::Simulator => 0.0,
            Backend::Hardware => HARDWARE_NOISE,
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub policy: AdmissionPolicy,
    pub oracle_noise: f64,
    pub oracle_seed: Option<u64>,
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse(&lookup, "PORT")?.unwrap_or(8080);

        let backend = match lookup("BACKEND") {
            Some(raw) => raw.parse()?,
            None => Backend::Simulator,
        };

        let max_iterations = match parse::<u64>(&lookup, "ADMISSION_MAX_ITERATIONS")? {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_MAX_ITERATIONS),
        };

        // 0 disables either cap
        let max_duration = match parse::<u64>(&lookup, "ADMISSION_MAX_SECS")? {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let policy = AdmissionPolicy {
            threshold: parse(&lookup, "ADMISSION_THRESHOLD")?
                .unwrap_or(backend.default_threshold()),
            shots: parse(&lookup, "ORACLE_SHOTS")?.unwrap_or(DEFAULT_SHOTS),
            nonce_width: parse(&lookup, "NONCE_WIDTH")?.unwrap_or(DEFAULT_NONCE_WIDTH),
            max_iterations,
            max_duration,
        };
        policy.validate()?;

        let oracle_noise: f64 = parse(&lookup, "ORACLE_NOISE")?.unwrap_or(backend.default_noise());
        if !(0.0..=1.0).contains(&oracle_noise) {
            return Err(ConfigError::InvalidValue {
                key: "ORACLE_NOISE",
                value: oracle_noise.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            backend,
            policy,
            oracle_noise,
            oracle_seed: parse(&lookup, "ORACLE_SEED")?,
        })
    }
}
