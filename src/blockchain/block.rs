use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::admission::{AdmissionPolicy, AdmissionReport, admit};
use super::nonce::derive_nonce;
use super::{GENESIS_PARTY, GENESIS_PREVIOUS_HASH};
use crate::error::AdmissionError;
use crate::oracle::Oracle;

/// Operator-supplied payload of a block. No parsing or arithmetic is
/// performed on any of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
}

/// A single admitted record in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub block_number: u64,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub previous_hash: String,
    pub timestamp: i64, // Unix millis (UTC), captured when admission starts
    pub nonce: String,  // Challenge bit-string, fixed for the block's lifetime
    pub accuracy: f64,  // Target frequency (%) at which admission succeeded
    pub block_hash: String,
}

impl Block {
    /// Synthesize the genesis block. Its threshold is zero, so admission is
    /// satisfied without consulting an oracle.
    pub fn genesis(nonce_width: usize) -> Self {
        let mut block = Self {
            block_number: 1,
            sender: GENESIS_PARTY.to_string(),
            receiver: GENESIS_PARTY.to_string(),
            amount: String::from("0"),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            nonce: derive_nonce(GENESIS_PREVIOUS_HASH, nonce_width),
            accuracy: 0.0,
            block_hash: String::new(),
        };
        block.block_hash = block.compute_hash();
        block
    }

    /// Derive the nonce, run admission against `oracle` and hash the result.
    /// Nothing is produced unless admission succeeds.
    pub fn create(
        transfer: Transfer,
        previous_hash: String,
        block_number: u64,
        oracle: &dyn Oracle,
        policy: &AdmissionPolicy,
    ) -> Result<(Self, AdmissionReport), AdmissionError> {
        let timestamp = Utc::now().timestamp_millis();
        let nonce = derive_nonce(&previous_hash, policy.nonce_width);
        let report = admit(oracle, &nonce, policy)?;

        let mut block = Self {
            block_number,
            sender: transfer.sender,
            receiver: transfer.receiver,
            amount: transfer.amount,
            previous_hash,
            timestamp,
            nonce,
            accuracy: report.final_accuracy,
            block_hash: String::new(),
        };
        block.block_hash = block.compute_hash();
        Ok((block, report))
    }

    /// SHA-256 over previous_hash, sender, receiver, amount, timestamp,
    /// nonce and accuracy, concatenated in that order.
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}{}{}{}{}{}{}",
            self.previous_hash,
            self.sender,
            self.receiver,
            self.amount,
            self.timestamp,
            self.nonce,
            self.accuracy
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the stored hash still matches the block's content.
    /// (Does NOT validate chain linkage.)
    pub fn is_valid(&self) -> bool {
        self.block_hash == self.compute_hash()
    }
}
