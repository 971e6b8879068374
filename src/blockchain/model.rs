use super::{Block, GENESIS_PREVIOUS_HASH};

/// Append-only, in-memory ledger. The chain itself performs no admission
/// checks on `append`; callers are expected to have run admission first.
#[derive(Debug)]
pub struct Blockchain {
    pub chain: Vec<Block>,
}

impl Blockchain {
    /// Initialize a new blockchain with a genesis block.
    pub fn new(nonce_width: usize) -> Self {
        Self {
            chain: vec![Block::genesis(nonce_width)],
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Add a block to the tail as-is.
    pub fn append(&mut self, block: Block) {
        self.chain.push(block);
    }

    /// Read-only view of every block, genesis first.
    pub fn list(&self) -> &[Block] {
        &self.chain
    }

    /// Block number and previous hash for the next block on the tip.
    /// Callers that admit concurrently must hold a writer lock from this
    /// read until the matching `append`.
    pub fn next_slot(&self) -> (u64, String) {
        (
            self.chain.len() as u64 + 1,
            self.last_block().block_hash.clone(),
        )
    }

    /// Validate the entire chain: genesis shape, linkage, numbering and hashes.
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if genesis.block_number != 1
            || genesis.previous_hash != GENESIS_PREVIOUS_HASH
            || genesis.accuracy != 0.0
            || !genesis.is_valid()
        {
            return false;
        }

        self.chain.windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.previous_hash == prev.block_hash
                && current.block_number == prev.block_number + 1
                && current.is_valid()
        })
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Render the chain as the operator's table listing.
    pub fn render_table(&self) -> String {
        let mut out = String::from(
            "Block Number | Block Hash                                                       | Receiver   | Sender     | Amount | Accuracy\n",
        );
        for b in &self.chain {
            out.push_str(&format!(
                "{:<12} | {} | {:<10} | {:<10} | {} | {:.2}%\n",
                b.block_number, b.block_hash, b.receiver, b.sender, b.amount, b.accuracy
            ));
        }
        out
    }
}
