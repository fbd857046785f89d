//! Spendable output tracked by the wallet, grounded in
//! `original_source/SDK/Plugin/Registry`'s `UTXO` entity and
//! `CoinBaseUTXODataStore`'s spent/unspent bookkeeping.

use serde::{Deserialize, Serialize};

use bigint::BigInt;
use element_set::{Hashable, PrevHashIndexed};
use uint::U256;
use TX_UNCONFIRMED;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
	pub tx_hash: U256,
	pub index: u16,
	pub asset_id: U256,
	pub amount: BigInt,
	pub output_lock: u32,
	pub block_height: u32,
	pub timestamp: u32,
	/// Set only for coinbase outputs; gates spendability until
	/// `block_height + COINBASE_MATURITY` confirmations have passed.
	pub is_coinbase: bool,
	/// Vote content this output was locked under when it was created by a
	/// `Vote` transaction; empty for ordinary and coinbase outputs. Spending
	/// such a UTXO as a vote input drops whatever content it carries.
	pub vote_contents: Vec<::transaction::VoteContent>,
}

impl Utxo {
	pub fn is_confirmed(&self) -> bool {
		self.block_height != TX_UNCONFIRMED
	}

	/// Whether this output is old enough to spend, given the chain's
	/// current tip height. Non-coinbase outputs only need one confirmation
	/// (their own inclusion); coinbase outputs need
	/// `COINBASE_MATURITY` (spec.md §6.5).
	pub fn is_spendable_at(&self, chain_height: u32, coinbase_maturity: u32) -> bool {
		if !self.is_confirmed() {
			return !self.is_coinbase;
		}
		if self.is_coinbase {
			chain_height.saturating_sub(self.block_height) >= coinbase_maturity
		} else {
			true
		}
	}

	fn hash_key(&self) -> U256 {
		// Outpoint hash is derived from (tx_hash, index); index is folded
		// into the low byte of a cloned hash so distinct outputs of the same
		// tx sort deterministically without needing a tuple key type.
		let mut bytes = *self.tx_hash.as_bytes();
		bytes[31] ^= (self.index & 0xFF) as u8;
		bytes[30] ^= (self.index >> 8) as u8;
		U256(bytes)
	}
}

impl Hashable for Utxo {
	fn element_hash(&self) -> U256 {
		self.hash_key()
	}
}

impl PrevHashIndexed for Utxo {
	fn prev_hash(&self) -> U256 {
		self.tx_hash
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn utxo(height: u32, coinbase: bool) -> Utxo {
		Utxo {
			tx_hash: U256::ZERO,
			index: 0,
			asset_id: U256::ZERO,
			amount: BigInt::from_u64(100),
			output_lock: 0,
			block_height: height,
			timestamp: 0,
			is_coinbase: coinbase,
			vote_contents: Vec::new(),
		}
	}

	#[test]
	fn coinbase_is_immature_before_maturity_window() {
		let u = utxo(100, true);
		assert!(!u.is_spendable_at(150, 100));
		assert!(!u.is_spendable_at(199, 100));
		assert!(u.is_spendable_at(200, 100));
	}

	#[test]
	fn regular_confirmed_output_is_always_spendable() {
		let u = utxo(100, false);
		assert!(u.is_spendable_at(100, 100));
	}

	#[test]
	fn unconfirmed_coinbase_is_never_spendable() {
		let u = utxo(TX_UNCONFIRMED, true);
		assert!(!u.is_spendable_at(1_000_000, 100));
	}
}
