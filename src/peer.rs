//! Network/peer collaborator interface, grounded in
//! `original_source/SDK/P2P/PeerManager.cpp`'s broadcast/sync-state surface.
//! No P2P networking is implemented here (spec.md §12 Non-goals); `Wallet`
//! only needs enough of a peer manager to broadcast signed transactions and
//! learn the chain's current tip.

use error::Result;
use transaction::Transaction;

pub trait PeerManager: Send + Sync {
	fn broadcast_transaction(&self, tx: &Transaction) -> Result<()>;
	fn last_block_height(&self) -> u32;
	fn last_block_timestamp(&self) -> u32;

	/// Fraction of headers synced, in `[0.0, 1.0]`, for SDK progress
	/// reporting (mirrors `PeerManager::GetSyncPercentage`).
	fn sync_progress(&self) -> f32;
}
