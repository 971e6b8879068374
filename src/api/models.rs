use actix_web::dev::ServerHandle;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::blockchain::{AdmissionPolicy, AdmissionReport, Block, Blockchain, Transfer};
use crate::error::AdmissionError;
use crate::oracle::Oracle;

/// Running totals across every admission attempt served by this process.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AdmissionStats {
    pub committed: u64,
    pub failed: u64,
    pub total_iterations: u64,
    pub last_report: Option<AdmissionReport>,
}

/// Shared application state: the single ledger, the oracle it is gated on
/// and the admission policy chosen at startup.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
    /// Held for a whole admission so only one block is in flight.
    pub admission: Mutex<()>,
    pub oracle: Arc<dyn Oracle>,
    pub policy: AdmissionPolicy,
    pub stats: Mutex<AdmissionStats>,
    pub server: Mutex<Option<ServerHandle>>,
}

impl AppState {
    pub fn new(oracle: Arc<dyn Oracle>, policy: AdmissionPolicy) -> Self {
        Self {
            blockchain: Mutex::new(Blockchain::new(policy.nonce_width)),
            admission: Mutex::new(()),
            oracle,
            policy,
            stats: Mutex::new(AdmissionStats::default()),
            server: Mutex::new(None),
        }
    }

    /// Admit a block on the current tip and append it.
    ///
    /// The chain lock is taken only to read the tip and to append; the
    /// oracle runs under the admission lock alone, so readers never wait
    /// on it. No other writer can move the tip in between.
    pub fn admit_block(
        &self,
        transfer: Transfer,
    ) -> Result<(Block, AdmissionReport), AdmissionError> {
        let _writer = self.admission.lock().expect("mutex poisoned");
        let (block_number, previous_hash) =
            self.blockchain.lock().expect("mutex poisoned").next_slot();

        let (block, report) = Block::create(
            transfer,
            previous_hash,
            block_number,
            self.oracle.as_ref(),
            &self.policy,
        )
        .inspect_err(|e| warn!("block #{block_number} rejected: {e}"))?;

        debug!(
            "block #{} admitted hash={} accuracy={:.2}% iterations={}",
            block.block_number, block.block_hash, block.accuracy, report.iterations
        );
        self.blockchain
            .lock()
            .expect("mutex poisoned")
            .append(block.clone());
        Ok((block, report))
    }
}

/* ---------- Block API Models ---------- */

#[derive(Deserialize)]
pub struct NewBlockRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct NewBlockResponse {
    pub block: Block,
    pub report: AdmissionReport,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub threshold: f64,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct StatsResponse<'a> {
    pub height: usize,
    pub policy: &'a AdmissionPolicy,
    pub admissions: AdmissionStats,
}
