pub mod admission;
pub mod block;
pub mod model;
pub mod nonce;

pub use admission::{AdmissionPolicy, AdmissionReport};
pub use block::{Block, Transfer};
pub use model::Blockchain;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Sender and receiver recorded on the genesis block.
pub const GENESIS_PARTY: &str = "Genesis";

/// Default challenge width in bits.
pub const DEFAULT_NONCE_WIDTH: usize = 12;

/// Default trials per oracle query.
pub const DEFAULT_SHOTS: u32 = 8192;

/// Threshold preset for the simulator backend (percent).
pub const SIMULATOR_THRESHOLD: f64 = 90.0;

/// Threshold preset for the hardware backend (percent).
pub const HARDWARE_THRESHOLD: f64 = 40.0;

/// Default depolarising noise emulating real hardware.
pub const HARDWARE_NOISE: f64 = 0.35;

/// Safety cap on oracle queries per block (0 in config disables it).
pub const DEFAULT_MAX_ITERATIONS: u64 = 1000;
