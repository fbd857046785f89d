//! Per-asset UTXO pool and transaction building, grounded in
//! `original_source/SDK/Wallet/GroupedAsset.cpp`. Coin selection uses two
//! fixed orders only — largest-first for spends, oldest-first for
//! consolidation — rather than a pluggable strategy trait: the reference
//! node never parameterizes this, and spec.md names exactly these two
//! behaviours, so a `CoinSelectionAlgorithm`-style trait (as `bdk`'s
//! `TxBuilder` exposes) would be generalizing past what is actually asked
//! for.

use address::Address;
use bigint::BigInt;
use element_set::ElementSet;
use error::{Error, Result};
use transaction::{Transaction, TransactionInput, TransactionOutput, TxType};
use uint::U256;
use utxo::Utxo;

/// One requested payment: destination address and amount.
#[derive(Clone, Debug)]
pub struct TxOutputTarget {
	pub address: Address,
	pub amount: BigInt,
}

#[derive(Clone, Debug, Default)]
pub struct BalanceInfo {
	pub total: BigInt,
	pub spendable: BigInt,
	pub pending: BigInt,
	pub locked: BigInt,
}

pub struct GroupedAsset {
	asset_id: U256,
	utxos: ElementSet<Utxo>,
	coinbase_utxos: ElementSet<Utxo>,
	vote_utxos: ElementSet<Utxo>,
	locked_balance: BigInt,
	chain_height: u32,
	coinbase_maturity: u32,
}

impl GroupedAsset {
	pub fn new(asset_id: U256, coinbase_maturity: u32) -> GroupedAsset {
		GroupedAsset {
			asset_id,
			utxos: ElementSet::new(),
			coinbase_utxos: ElementSet::new(),
			vote_utxos: ElementSet::new(),
			locked_balance: BigInt::zero(),
			chain_height: 0,
			coinbase_maturity,
		}
	}

	pub fn asset_id(&self) -> U256 {
		self.asset_id
	}

	pub fn set_chain_height(&mut self, height: u32) {
		self.chain_height = height;
	}

	pub fn update_locked_balance(&mut self, locked: BigInt) {
		self.locked_balance = locked;
	}

	pub fn add_utxo(&mut self, utxo: Utxo) {
		if utxo.is_coinbase {
			self.coinbase_utxos.insert(utxo);
		} else {
			self.utxos.insert(utxo);
		}
	}

	pub fn add_vote_utxo(&mut self, utxo: Utxo) {
		self.vote_utxos.insert(utxo);
	}

	/// Removes the UTXO at `(tx_hash, index)` from whichever pool it lives
	/// in, returning it so the caller can tell which asset's balance changed
	/// and, if it was a coinbase UTXO, report it via `coinBaseSpent`.
	pub fn remove_spent_utxo(&mut self, tx_hash: &U256, index: u16) -> Option<Utxo> {
		let key = utxo_key(tx_hash, index);
		self.utxos
			.remove_hash(&key)
			.or_else(|| self.coinbase_utxos.remove_hash(&key))
			.or_else(|| self.vote_utxos.remove_hash(&key))
	}

	fn spendable_utxos(&self) -> Vec<&Utxo> {
		let mut spendable: Vec<&Utxo> = self
			.utxos
			.iter()
			.chain(self.coinbase_utxos.iter())
			.filter(|u| u.is_spendable_at(self.chain_height, self.coinbase_maturity))
			.collect();
		spendable.sort_by_key(|u| (u.block_height, u.tx_hash, u.index));
		spendable
	}

	pub fn balance(&self) -> BigInt {
		self.spendable_utxos().into_iter().map(|u| u.amount.clone()).sum()
	}

	pub fn balance_info(&self) -> BalanceInfo {
		let spendable: BigInt = self.spendable_utxos().into_iter().map(|u| u.amount.clone()).sum();
		let pending: BigInt = self
			.utxos
			.iter()
			.chain(self.coinbase_utxos.iter())
			.filter(|u| !u.is_spendable_at(self.chain_height, self.coinbase_maturity))
			.map(|u| u.amount.clone())
			.sum();
		BalanceInfo {
			total: spendable.clone() + &pending,
			spendable,
			pending,
			locked: self.locked_balance.clone(),
		}
	}

	/// All UTXOs this asset currently tracks, spendable or not, for SDK-level
	/// listing (`SubWallet::GetAllUTXOs`).
	pub fn all_utxos(&self) -> Vec<Utxo> {
		self.utxos.iter().chain(self.coinbase_utxos.iter()).cloned().collect()
	}

	pub fn vote_balance(&self) -> BigInt {
		self.vote_utxos.iter().map(|u| u.amount.clone()).sum()
	}

	/// Select UTXOs largest-first until `target` is covered, as
	/// `GroupedAsset::CreateTxForOutputs` does for ordinary spends: biggest
	/// inputs first minimizes the input count (and hence fee) for a typical
	/// payment.
	fn select_largest_first(&self, target: &BigInt) -> Result<Vec<&Utxo>> {
		self.select_largest_first_from(self.spendable_utxos(), target)
	}

	/// Same largest-first selection as [`select_largest_first`], but over a
	/// caller-supplied candidate list instead of `spendable_utxos()`; `vote`
	/// uses this to widen the candidate set with vote-locked UTXOs that are
	/// safe to reuse.
	fn select_largest_first_from<'a>(&self, mut candidates: Vec<&'a Utxo>, target: &BigInt) -> Result<Vec<&'a Utxo>> {
		candidates.sort_by(|a, b| b.amount.cmp(&a.amount));
		let mut chosen = Vec::new();
		let mut sum = BigInt::zero();
		for utxo in candidates {
			if &sum >= target {
				break;
			}
			sum = sum + utxo.amount.clone();
			chosen.push(utxo);
		}
		if &sum < target {
			let shortfall = target.clone() - sum;
			return Err(Error::InsufficientBalance { shortfall });
		}
		Ok(chosen)
	}

	/// Select UTXOs oldest-first (lowest block height, then tx hash order),
	/// as `GroupedAsset::Consolidate` does: consolidation exists to shrink
	/// the UTXO set, so it folds in the oldest dust first regardless of
	/// size.
	fn select_oldest_first(&self, max_inputs: usize) -> Vec<&Utxo> {
		// spendable_utxos() is already sorted ascending by (height, tx_hash,
		// index), i.e. oldest first.
		self.spendable_utxos().into_iter().take(max_inputs).collect()
	}

	fn fee_for_input_count(&self, input_count: usize, output_count: usize, fee_per_kb: u64) -> BigInt {
		// Rough size model: 41 bytes/input + 34 bytes/output + 10 bytes
		// overhead, rounded up to the next kilobyte-rate charge
		// (spec.md §4.5 step 6).
		let size = 10 + input_count * 41 + output_count * 34;
		BigInt::from_u64(size as u64).ceil_div_u64(1000) * BigInt::from_u64(fee_per_kb)
	}

	/// Build a `TransferAsset` transaction paying `targets`, iterating the
	/// fee a few times as the input set (and hence size) grows, mirroring
	/// `GroupedAsset::CreateTxForOutputs`'s fee-composition loop.
	pub fn create_tx_for_outputs(
		&self,
		targets: &[TxOutputTarget],
		change_address: &Address,
		fee_per_kb: u64,
	) -> Result<Transaction> {
		if targets.is_empty() {
			return Err(Error::CreateTransaction("no outputs given".to_string()));
		}
		let payment_total: BigInt = targets.iter().map(|t| t.amount.clone()).sum();

		let mut fee = self.fee_for_input_count(1, targets.len() + 1, fee_per_kb);
		let mut chosen;
		// The input count (and hence the fee) only grows monotonically as
		// we re-select for a larger target, so this converges quickly; cap
		// iterations as a backstop against a pathological UTXO layout.
		let mut iterations = 0;
		loop {
			let target = payment_total.clone() + &fee;
			chosen = self.select_largest_first(&target)?;
			let new_fee = self.fee_for_input_count(chosen.len(), targets.len() + 1, fee_per_kb);
			iterations += 1;
			if new_fee == fee || iterations > 8 {
				break;
			}
			fee = new_fee;
		}

		let input_total: BigInt = chosen.iter().map(|u| u.amount.clone()).sum();
		let change = input_total - payment_total.clone() - fee.clone();

		let inputs = chosen
			.iter()
			.map(|u| TransactionInput {
				tx_hash: u.tx_hash,
				index: u.index,
				sequence: 0xFFFF_FFFF,
			})
			.collect();

		let mut outputs: Vec<TransactionOutput> = targets
			.iter()
			.enumerate()
			.map(|(i, t)| TransactionOutput {
				asset_id: self.asset_id,
				amount: t.amount.clone(),
				address: t.address,
				output_lock: 0,
				fixed_index: i as u16,
			})
			.collect();
		if !change.is_zero() {
			let idx = outputs.len() as u16;
			outputs.push(TransactionOutput {
				asset_id: self.asset_id,
				amount: change,
				address: *change_address,
				output_lock: 0,
				fixed_index: idx,
			});
		}

		Ok(new_transfer_tx(inputs, outputs, fee))
	}

	/// Fold up to `max_inputs` of the oldest spendable outputs into a single
	/// self-payment, per `GroupedAsset::Consolidate`.
	pub fn consolidate(&self, max_inputs: usize, receive_address: &Address, fee_per_kb: u64) -> Result<Transaction> {
		let chosen = self.select_oldest_first(max_inputs);
		if chosen.len() < 2 {
			return Err(Error::CreateTransaction("not enough UTXOs to consolidate".to_string()));
		}
		let input_total: BigInt = chosen.iter().map(|u| u.amount.clone()).sum();
		let fee = self.fee_for_input_count(chosen.len(), 1, fee_per_kb);
		if input_total < fee {
			return Err(Error::InsufficientBalance {
				shortfall: fee.clone() - input_total,
			});
		}
		let amount = input_total - fee.clone();

		let inputs = chosen
			.iter()
			.map(|u| TransactionInput {
				tx_hash: u.tx_hash,
				index: u.index,
				sequence: 0xFFFF_FFFF,
			})
			.collect();
		let outputs = vec![TransactionOutput {
			asset_id: self.asset_id,
			amount,
			address: *receive_address,
			output_lock: 0,
			fixed_index: 0,
		}];
		Ok(new_transfer_tx(inputs, outputs, fee))
	}

	/// Candidates available to a new vote: ordinary spendable UTXOs plus any
	/// vote-locked UTXO whose existing lock doesn't cover `requested_types`.
	/// A UTXO already locked under one of `requested_types` is excluded
	/// outright, matching spec.md's "filtered to exclude UTXOs whose
	/// existing vote lock forbids reuse under the requested vote type".
	fn vote_candidates(&self, requested_types: &[u8]) -> Vec<&Utxo> {
		let mut candidates = self.spendable_utxos();
		let mut reusable: Vec<&Utxo> = self
			.vote_utxos
			.iter()
			.filter(|u| !u.vote_contents.iter().any(|c| requested_types.contains(&c.vote_type)))
			.collect();
		candidates.append(&mut reusable);
		candidates
	}

	/// Lock `vote_amount` into a self-paid output carrying a `Vote` payload,
	/// per `GroupedAsset::Vote`. Returns, alongside the transaction, any
	/// prior `VoteContent` dropped because the UTXO that carried it was
	/// consumed as an input here, so the caller can warn about it.
	pub fn vote(
		&self,
		contents: Vec<::transaction::VoteContent>,
		vote_amount: BigInt,
		owner_address: &Address,
		fee_per_kb: u64,
	) -> Result<(Transaction, Vec<::transaction::VoteContent>)> {
		let requested_types: Vec<u8> = contents.iter().map(|c| c.vote_type).collect();
		let fee = self.fee_for_input_count(1, 2, fee_per_kb);
		let target = vote_amount.clone() + &fee;
		let chosen = self.select_largest_first_from(self.vote_candidates(&requested_types), &target)?;
		let input_total: BigInt = chosen.iter().map(|u| u.amount.clone()).sum();
		let change = input_total - vote_amount.clone() - fee.clone();
		let dropped_votes: Vec<::transaction::VoteContent> =
			chosen.iter().flat_map(|u| u.vote_contents.iter().cloned()).collect();

		let inputs = chosen
			.iter()
			.map(|u| TransactionInput {
				tx_hash: u.tx_hash,
				index: u.index,
				sequence: 0xFFFF_FFFF,
			})
			.collect();
		let mut outputs = vec![TransactionOutput {
			asset_id: self.asset_id,
			amount: vote_amount,
			address: *owner_address,
			output_lock: 0,
			fixed_index: 0,
		}];
		if !change.is_zero() {
			outputs.push(TransactionOutput {
				asset_id: self.asset_id,
				amount: change,
				address: *owner_address,
				output_lock: 0,
				fixed_index: 1,
			});
		}

		let mut tx = new_transfer_tx(inputs, outputs, fee);
		tx.tx_type = TxType::Vote;
		tx.payload = ::transaction::Payload::Vote { contents };
		Ok((tx, dropped_votes))
	}

	/// Build a `ReturnDepositCoin` transaction spending a single deposit
	/// UTXO back to `receive_address`, per `GroupedAsset::
	/// CreateRetrieveTransaction`.
	pub fn create_retrieve_deposit_tx(&self, deposit_tx_hash: &U256, deposit_index: u16, amount: BigInt, receive_address: &Address, fee_per_kb: u64) -> Result<Transaction> {
		let fee = self.fee_for_input_count(1, 1, fee_per_kb);
		if amount < fee {
			return Err(Error::InsufficientBalance {
				shortfall: fee.clone() - amount,
			});
		}
		let inputs = vec![TransactionInput {
			tx_hash: *deposit_tx_hash,
			index: deposit_index,
			sequence: 0xFFFF_FFFF,
		}];
		let outputs = vec![TransactionOutput {
			asset_id: self.asset_id,
			amount: amount - fee.clone(),
			address: *receive_address,
			output_lock: 0,
			fixed_index: 0,
		}];
		let mut tx = new_transfer_tx(inputs, outputs, fee);
		tx.tx_type = TxType::ReturnDepositCoin;
		tx.payload = ::transaction::Payload::ReturnDepositCoin;
		Ok(tx)
	}
}

fn utxo_key(tx_hash: &U256, index: u16) -> U256 {
	let mut bytes = *tx_hash.as_bytes();
	bytes[31] ^= (index & 0xFF) as u8;
	bytes[30] ^= (index >> 8) as u8;
	U256(bytes)
}

fn new_transfer_tx(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>, fee: BigInt) -> Transaction {
	Transaction {
		version: 9,
		tx_type: TxType::TransferAsset,
		payload_version: 0,
		payload: ::transaction::Payload::TransferAsset,
		inputs,
		outputs,
		attributes: Vec::new(),
		programs: Vec::new(),
		lock_time: 0,
		block_height: ::TX_UNCONFIRMED,
		timestamp: 0,
		fee,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use address::Prefix;

	fn addr() -> Address {
		Address::from_pubkey(Prefix::Standard, &[0x02u8; 33])
	}

	fn utxo(height: u32, amount: u64, coinbase: bool) -> Utxo {
		Utxo {
			tx_hash: U256::from_bytes(&[height as u8; 32]).unwrap(),
			index: 0,
			asset_id: U256::ZERO,
			amount: BigInt::from_u64(amount),
			output_lock: 0,
			block_height: height,
			timestamp: 0,
			is_coinbase: coinbase,
			vote_contents: Vec::new(),
		}
	}

	fn asset_with(utxos: Vec<Utxo>, height: u32) -> GroupedAsset {
		let mut asset = GroupedAsset::new(U256::ZERO, 100);
		asset.set_chain_height(height);
		for u in utxos {
			asset.add_utxo(u);
		}
		asset
	}

	#[test]
	fn largest_first_minimizes_input_count() {
		let asset = asset_with(vec![utxo(1, 100, false), utxo(2, 500, false), utxo(3, 50, false)], 10);
		let tx = asset
			.create_tx_for_outputs(
				&[TxOutputTarget {
					address: addr(),
					amount: BigInt::from_u64(400),
				}],
				&addr(),
				10_000,
			)
			.unwrap();
		assert_eq!(tx.inputs.len(), 1);
	}

	#[test]
	fn insufficient_balance_reports_shortfall() {
		let asset = asset_with(vec![utxo(1, 10, false)], 10);
		let err = asset
			.create_tx_for_outputs(
				&[TxOutputTarget {
					address: addr(),
					amount: BigInt::from_u64(1_000_000),
				}],
				&addr(),
				10_000,
			)
			.unwrap_err();
		match err {
			Error::InsufficientBalance { .. } => {}
			_ => panic!("expected InsufficientBalance"),
		}
	}

	#[test]
	fn immature_coinbase_is_excluded_from_balance() {
		let asset = asset_with(vec![utxo(1, 1_000, true)], 50);
		assert!(asset.balance().is_zero());
	}

	fn vote_utxo(height: u32, amount: u64, vote_type: u8) -> Utxo {
		let mut u = utxo(height, amount, false);
		u.vote_contents = vec![::transaction::VoteContent { vote_type, candidates: vec![vec![1]] }];
		u
	}

	#[test]
	fn vote_draws_from_plain_utxos_before_touching_vote_locked_ones() {
		let mut asset = asset_with(vec![utxo(1, 1_000, false)], 10);
		asset.add_vote_utxo(vote_utxo(1, 1_000, 0));
		let (tx, dropped) = asset
			.vote(
				vec![::transaction::VoteContent { vote_type: 0, candidates: vec![vec![9]] }],
				BigInt::from_u64(100),
				&addr(),
				10_000,
			)
			.unwrap();
		assert!(dropped.is_empty());
		assert_eq!(tx.inputs.len(), 1);
		assert_eq!(tx.inputs[0].tx_hash, U256::from_bytes(&[1u8; 32]).unwrap());
	}

	#[test]
	fn vote_reusing_a_locked_utxo_of_a_different_type_reports_the_dropped_vote() {
		let mut asset = asset_with(vec![], 10);
		asset.add_vote_utxo(vote_utxo(1, 1_000, 1));
		let (_tx, dropped) = asset
			.vote(
				vec![::transaction::VoteContent { vote_type: 0, candidates: vec![vec![9]] }],
				BigInt::from_u64(100),
				&addr(),
				10_000,
			)
			.unwrap();
		assert_eq!(dropped.len(), 1);
		assert_eq!(dropped[0].vote_type, 1);
	}

	#[test]
	fn vote_cannot_reuse_a_utxo_already_locked_for_the_same_vote_type() {
		let mut asset = asset_with(vec![], 10);
		asset.add_vote_utxo(vote_utxo(1, 1_000, 0));
		let err = asset
			.vote(
				vec![::transaction::VoteContent { vote_type: 0, candidates: vec![vec![9]] }],
				BigInt::from_u64(100),
				&addr(),
				10_000,
			)
			.unwrap_err();
		match err {
			Error::InsufficientBalance { .. } => {}
			_ => panic!("expected InsufficientBalance"),
		}
	}

	#[test]
	fn consolidate_folds_oldest_utxos_first() {
		let asset = asset_with(
			vec![utxo(5, 100, false), utxo(1, 100, false), utxo(3, 100, false), utxo(2, 100, false)],
			10,
		);
		let tx = asset.consolidate(2, &addr(), 10_000).unwrap();
		assert_eq!(tx.inputs.len(), 2);
		assert!(tx.inputs.iter().any(|i| i.tx_hash == U256::from_bytes(&[1u8; 32]).unwrap()));
		assert!(tx.inputs.iter().any(|i| i.tx_hash == U256::from_bytes(&[2u8; 32]).unwrap()));
	}
}
