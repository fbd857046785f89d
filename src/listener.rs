//! Wallet event listener surface, grounded in
//! `original_source/SDK/Wallet/Wallet.h`'s `Listener` interface. The wallet
//! holds a `Weak` reference so a listener that also owns the wallet (as SDK
//! consumers typically do) never creates a reference cycle, and every
//! fanout happens only after the wallet's internal lock is released
//! (spec.md §8.2), so a listener callback is free to call back into the
//! wallet without deadlocking.

use bigint::BigInt;
use transaction::Transaction;
use uint::{U168, U256};

pub trait WalletListener: Send + Sync {
	fn balance_changed(&self, asset_id: &U256, new_balance: &BigInt) {
		let _ = (asset_id, new_balance);
	}

	fn on_tx_added(&self, tx: &Transaction) {
		let _ = tx;
	}

	fn on_tx_updated(&self, tx_hash: &U256, block_height: u32, timestamp: u32) {
		let _ = (tx_hash, block_height, timestamp);
	}

	fn on_tx_updated_all(&self) {}

	fn on_tx_deleted(&self, tx_hash: &U256, notify_user: bool, recommend_rescan: bool) {
		let _ = (tx_hash, notify_user, recommend_rescan);
	}

	fn on_coinbase_tx_added(&self, tx: &Transaction) {
		let _ = tx;
	}

	fn on_coinbase_updated_all(&self) {}

	fn on_coinbase_tx_updated(&self, tx_hashes: &[U256], block_height: u32, timestamp: u32) {
		let _ = (tx_hashes, block_height, timestamp);
	}

	fn on_coinbase_spent(&self, tx_hashes: &[U256]) {
		let _ = tx_hashes;
	}

	fn on_coinbase_tx_deleted(&self, tx_hash: &U256, notify_user: bool, recommend_rescan: bool) {
		let _ = (tx_hash, notify_user, recommend_rescan);
	}

	fn on_asset_registered(&self, asset_id: &U256, amount: &BigInt, controller: &U168) {
		let _ = (asset_id, amount, controller);
	}
}
