//! The wallet core state machine, grounded in
//! `original_source/SDK/Wallet/Wallet.cpp`. A single `Mutex` guards every
//! mutable field; methods take the lock for the shortest span that touches
//! shared state and always release it before firing listener callbacks, so
//! a listener calling back into the wallet (e.g. to read the new balance)
//! never deadlocks (spec.md §8.2).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Weak};

use address::Address;
use bigint::BigInt;
use config::WalletConfig;
use element_set::ElementSet;
use error::{Error, Result};
use grouped_asset::{BalanceInfo, GroupedAsset, TxOutputTarget};
use hdkeychain::Chain;
use listener::WalletListener;
use subaccount::SubAccount;
use transaction::{Asset, Payload, Transaction, TxType};
use uint::{U168, U256};
use utxo::Utxo;

struct WalletState {
	sub_account: SubAccount,
	assets: HashMap<U256, GroupedAsset>,
	/// Ascending order (confirmation height, then input-dependency, then
	/// chain-index tie-break) of every non-coinbase transaction this wallet
	/// has registered. The hashes also live in `all_tx`; this tracks the
	/// order `Wallet::InsertTx` maintains for history display and
	/// dependent-first removal.
	tx_order: Vec<U256>,
	all_tx: ElementSet<Transaction>,
	coinbase_tx: ElementSet<Transaction>,
	/// Outpoints referenced by an input of any *unconfirmed* transaction
	/// this wallet has registered, so a second unconfirmed spend of the
	/// same output is rejected (`Wallet::AddSpendingUTXO`).
	spending_outputs: HashSet<(U256, u16)>,
	chain_height: u32,
}

pub struct Wallet {
	config: WalletConfig,
	state: Mutex<WalletState>,
	listener: Mutex<Weak<dyn WalletListener>>,
}

impl Wallet {
	pub fn new(config: WalletConfig, sub_account: SubAccount) -> Wallet {
		Wallet {
			config,
			state: Mutex::new(WalletState {
				sub_account,
				assets: HashMap::new(),
				tx_order: Vec::new(),
				all_tx: ElementSet::new(),
				coinbase_tx: ElementSet::new(),
				spending_outputs: HashSet::new(),
				chain_height: 0,
			}),
			listener: Mutex::new(Weak::new()),
		}
	}

	pub fn set_listener(&self, listener: Weak<dyn WalletListener>) {
		*self.listener.lock().unwrap() = listener;
	}

	fn with_listener<F: FnOnce(&dyn WalletListener)>(&self, f: F) {
		if let Some(listener) = self.listener.lock().unwrap().upgrade() {
			f(&*listener);
		}
	}

	/// Registers `asset_id` as known to the wallet, creating an empty UTXO
	/// pool for it, per `Wallet::InstallAssets`.
	pub fn install_asset(&self, asset_id: U256) {
		let mut state = self.state.lock().unwrap();
		if state.assets.contains_key(&asset_id) {
			return;
		}
		info!("installing asset {} on wallet {}", asset_id, self.config.wallet_id);
		state.assets.insert(asset_id, GroupedAsset::new(asset_id, self.config.coinbase_maturity));
	}

	pub fn install_default_asset(&self) {
		self.install_asset(Asset::ela_id());
	}

	pub fn set_chain_height(&self, height: u32) {
		let mut state = self.state.lock().unwrap();
		state.chain_height = height;
		for asset in state.assets.values_mut() {
			asset.set_chain_height(height);
		}
	}

	pub fn receive_address(&self) -> Result<Address> {
		let mut state = self.state.lock().unwrap();
		state.sub_account.receive_address()
	}

	pub fn contains_transaction(&self, hash: &U256) -> bool {
		let state = self.state.lock().unwrap();
		state.all_tx.contains_hash(hash) || state.coinbase_tx.contains_hash(hash)
	}

	pub fn transaction_for_hash(&self, hash: &U256) -> Option<Transaction> {
		let state = self.state.lock().unwrap();
		state.all_tx.get(hash).or_else(|| state.coinbase_tx.get(hash)).cloned()
	}

	pub fn get_balance(&self, asset_id: &U256) -> BigInt {
		let state = self.state.lock().unwrap();
		state.assets.get(asset_id).map(|a| a.balance()).unwrap_or_else(BigInt::zero)
	}

	pub fn get_balance_info(&self, asset_id: &U256) -> BalanceInfo {
		let state = self.state.lock().unwrap();
		state.assets.get(asset_id).map(|a| a.balance_info()).unwrap_or_default()
	}

	pub fn all_utxos(&self, asset_id: &U256) -> Vec<Utxo> {
		let state = self.state.lock().unwrap();
		state.assets.get(asset_id).map(|a| a.all_utxos()).unwrap_or_default()
	}

	/// Every non-coinbase transaction this wallet has registered, in the
	/// ascending order `tx_order` maintains.
	pub fn get_all_transactions(&self) -> Vec<Transaction> {
		let state = self.state.lock().unwrap();
		state.tx_order.iter().filter_map(|h| state.all_tx.get(h).cloned()).collect()
	}

	pub fn get_all_coinbase_transactions(&self) -> Vec<Transaction> {
		let state = self.state.lock().unwrap();
		state.coinbase_tx.iter().cloned().collect()
	}

	/// Every `assetID` this wallet has installed a `GroupedAsset` for.
	pub fn get_all_assets(&self) -> Vec<U256> {
		let state = self.state.lock().unwrap();
		state.assets.keys().cloned().collect()
	}

	pub fn get_asset_balance(&self, asset_id: &U256) -> Option<BigInt> {
		let state = self.state.lock().unwrap();
		state.assets.get(asset_id).map(|a| a.balance())
	}

	pub fn contains_address(&self, address: &Address) -> bool {
		let state = self.state.lock().unwrap();
		state.sub_account.contains_address(address)
	}

	pub fn get_all_addresses(&self, chain: Chain) -> Vec<Address> {
		let state = self.state.lock().unwrap();
		state.sub_account.all_addresses(chain)
	}

	/// Transactions confirmed no later than `height`, for a wallet replaying
	/// a bounded prefix of its history.
	pub fn tx_unconfirmed_before(&self, height: u32) -> Vec<Transaction> {
		let state = self.state.lock().unwrap();
		state
			.tx_order
			.iter()
			.filter_map(|h| state.all_tx.get(h))
			.filter(|t| t.block_height == ::TX_UNCONFIRMED || t.block_height <= height)
			.cloned()
			.collect()
	}

	/// Drops every output that doesn't pay a wallet address from a
	/// pure-receive transaction, keeping each surviving output's
	/// `fixed_index` unchanged so any input elsewhere still resolves
	/// against the original position (spec.md §4.7). No-op for any
	/// transaction that isn't a pure receive (i.e. one of its own inputs is
	/// also ours, or none of its outputs are ours).
	pub fn strip_transaction(&self, tx: &Transaction) -> Transaction {
		let state = self.state.lock().unwrap();
		let has_own_input = tx.inputs.iter().any(|i| prev_output_is_own(&state, i.tx_hash, i.index));
		let has_own_output = tx.outputs.iter().any(|o| state.sub_account.contains_address(&o.address));
		if has_own_input || !has_own_output {
			return tx.clone();
		}
		let kept: Vec<_> = tx
			.outputs
			.iter()
			.filter(|o| state.sub_account.contains_address(&o.address))
			.cloned()
			.collect();
		if kept.len() == tx.outputs.len() {
			return tx.clone();
		}
		info!("stripping tx {}: {} outputs -> {}", tx.hash(), tx.outputs.len(), kept.len());
		let mut stripped = tx.clone();
		stripped.outputs = kept;
		stripped
	}

	/// Whether a transaction pays the wallet's own addresses without any of
	/// its inputs belonging to the wallet, per
	/// `Wallet::IsReceiveTransaction`.
	pub fn is_receive_transaction(&self, tx: &Transaction) -> bool {
		let state = self.state.lock().unwrap();
		let has_own_input = tx.inputs.iter().any(|i| prev_output_is_own(&state, i.tx_hash, i.index));
		let has_own_output = tx.outputs.iter().any(|o| state.sub_account.contains_address(&o.address));
		has_own_output && !has_own_input
	}

	/// Net amount this wallet sent via `tx`: sum of its own spent inputs
	/// minus its own change outputs, per `Wallet::AmountSentByTx`.
	pub fn amount_sent_by_tx(&self, tx: &Transaction) -> BigInt {
		let state = self.state.lock().unwrap();
		let mut sent = BigInt::zero();
		for input in &tx.inputs {
			if let Some(out) = prev_output(&state, input.tx_hash, input.index) {
				if state.sub_account.contains_address(&out.address) {
					sent = sent + out.amount.clone();
				}
			}
		}
		for output in &tx.outputs {
			if state.sub_account.contains_address(&output.address) {
				sent = sent - output.amount.clone();
			}
		}
		sent
	}

	/// Composes a `TransferAsset` transaction paying `targets` out of
	/// `asset_id`'s spendable UTXOs, per `GroupedAsset::CreateTxForOutputs`
	/// (spec.md §4.5). Change, if any, goes to a fresh internal address.
	pub fn create_tx_for_outputs(&self, asset_id: &U256, targets: &[TxOutputTarget]) -> Result<Transaction> {
		let state = self.state.lock().unwrap();
		let asset = state
			.assets
			.get(asset_id)
			.ok_or_else(|| Error::InvalidAsset(asset_id.to_hex()))?;
		let change_address = state
			.sub_account
			.unused_addresses(Chain::Internal)
			.into_iter()
			.next()
			.ok_or_else(|| Error::CreateTransaction("no internal address available for change".to_string()))?;
		asset.create_tx_for_outputs(targets, &change_address, self.config.fee_per_kb)
	}

	/// Folds up to `max_inputs` of `asset_id`'s oldest spendable UTXOs into a
	/// single self-payment, per `GroupedAsset::Consolidate`.
	pub fn consolidate(&self, asset_id: &U256, max_inputs: usize) -> Result<Transaction> {
		let mut state = self.state.lock().unwrap();
		let receive_address = state.sub_account.receive_address()?;
		let asset = state
			.assets
			.get(asset_id)
			.ok_or_else(|| Error::InvalidAsset(asset_id.to_hex()))?;
		asset.consolidate(max_inputs, &receive_address, self.config.fee_per_kb)
	}

	/// Deposit address for registering this wallet as a block producer,
	/// per `Wallet::GetOwnerDepositAddress`.
	pub fn get_owner_deposit_address(&self) -> Result<Address> {
		let state = self.state.lock().unwrap();
		state.sub_account.owner_deposit_address()
	}

	/// Deposit address for registering this wallet as a CR-council sponsor,
	/// per `Wallet::GetCROwnerDepositAddress`.
	pub fn get_cr_owner_deposit_address(&self) -> Result<Address> {
		let state = self.state.lock().unwrap();
		state.sub_account.cr_owner_deposit_address()
	}

	/// How many of the `m` required multi-sig signatures this wallet's
	/// sub-account can still contribute, per `SubAccount::GetSignedInfo`
	/// (spec.md §8 scenario 6).
	pub fn signed_info(&self, signers_present: usize) -> (usize, bool) {
		let state = self.state.lock().unwrap();
		state.sub_account.signed_info(signers_present)
	}

	/// Registers a transaction observed either in the mempool or in a
	/// block. Returns `false` if the transaction was already known.
	/// Mirrors `Wallet::RegisterTransaction`.
	pub fn register_transaction(&self, tx: Transaction) -> Result<bool> {
		if !tx.is_signed() {
			warn!("rejecting unsigned non-coinbase tx {}", tx.hash());
			return Err(Error::Sign(format!("transaction {} has no program attached", tx.hash())));
		}

		let hash = tx.hash();
		let relevant;
		let mut affected_assets = HashSet::new();
		{
			let mut state = self.state.lock().unwrap();
			if tx.is_coinbase() {
				if state.coinbase_tx.contains_hash(&hash) {
					return Ok(false);
				}
				relevant = tx_touches_wallet(&state, &tx);
				state.coinbase_tx.insert(tx.clone());
			} else {
				if state.all_tx.contains_hash(&hash) {
					return Ok(false);
				}
				relevant = tx_touches_wallet(&state, &tx);
				insert_tx_ascending(&mut state, tx.clone());
			}

			if relevant {
				if tx.block_height != ::TX_UNCONFIRMED {
					let effects = apply_confirmed_effects(&mut state, &tx);
					affected_assets = effects.affected_assets;
				} else {
					for input in &tx.inputs {
						state.spending_outputs.insert((input.tx_hash, input.index));
					}
				}
				for output in &tx.outputs {
					if state.sub_account.contains_address(&output.address) {
						let _ = state.sub_account.mark_used(&output.address);
					}
				}
			} else {
				debug!("tx {} does not touch any of our addresses, not relevant", hash);
			}
		}

		if relevant {
			info!("registered tx {} at height {}", hash, tx.block_height);
			if tx.is_coinbase() {
				self.with_listener(|l| l.on_coinbase_tx_added(&tx));
			} else {
				self.with_listener(|l| l.on_tx_added(&tx));
			}
			for asset_id in &affected_assets {
				let balance = self.get_balance(asset_id);
				debug!("balance for asset {} is now {}", asset_id, balance);
				self.with_listener(|l| l.balance_changed(asset_id, &balance));
			}
		}
		Ok(true)
	}

	/// Promotes previously-unconfirmed transactions to confirmed at
	/// `block_height`, per `Wallet::UpdateTransactions`.
	pub fn update_transactions(&self, hashes: &[U256], block_height: u32, timestamp: u32) {
		let mut updated = false;
		let mut coinbase_updated = Vec::new();
		let mut affected_assets = HashSet::new();
		let mut spent_coinbase = Vec::new();
		let mut registered: Vec<(U256, u64, U168)> = Vec::new();
		{
			let mut state = self.state.lock().unwrap();
			for hash in hashes {
				if let Some(tx) = state.all_tx.get(hash).cloned() {
					if tx.block_height == block_height && tx.timestamp == timestamp {
						continue;
					}
					let was_unconfirmed = tx.block_height == ::TX_UNCONFIRMED;
					let mut updated_tx = tx.clone();
					updated_tx.block_height = block_height;
					updated_tx.timestamp = timestamp;
					if was_unconfirmed && block_height != ::TX_UNCONFIRMED {
						if let Payload::RegisterAsset { amount, controller, .. } = &tx.payload {
							registered.push((tx.hash(), *amount, *controller));
						}
					}
					let effects = apply_confirmed_effects(&mut state, &updated_tx);
					affected_assets.extend(effects.affected_assets);
					spent_coinbase.extend(effects.spent_coinbase);
					state.all_tx.insert(updated_tx);
					updated = true;
				} else if let Some(cb) = state.coinbase_tx.get(hash).cloned() {
					if cb.block_height == block_height && cb.timestamp == timestamp {
						continue;
					}
					let mut updated_cb = cb.clone();
					updated_cb.block_height = block_height;
					updated_cb.timestamp = timestamp;
					state.coinbase_tx.insert(updated_cb);
					coinbase_updated.push(*hash);
				}
			}
			for (asset_id, _amount, _controller) in &registered {
				if !state.assets.contains_key(asset_id) {
					info!("installing asset {} from confirmed RegisterAsset tx", asset_id);
					state.assets.insert(*asset_id, GroupedAsset::new(*asset_id, self.config.coinbase_maturity));
				}
			}
		}
		if updated {
			self.with_listener(|l| l.on_tx_updated_all());
		}
		if !coinbase_updated.is_empty() {
			self.with_listener(|l| l.on_coinbase_tx_updated(&coinbase_updated, block_height, timestamp));
		}
		if !spent_coinbase.is_empty() {
			let hashes: Vec<U256> = spent_coinbase.iter().map(|u| u.tx_hash).collect();
			self.with_listener(|l| l.on_coinbase_spent(&hashes));
		}
		for (asset_id, amount, controller) in &registered {
			self.with_listener(|l| l.on_asset_registered(asset_id, &BigInt::from_u64(*amount), controller));
		}
		for asset_id in &affected_assets {
			let balance = self.get_balance(asset_id);
			self.with_listener(|l| l.balance_changed(asset_id, &balance));
		}
	}

	/// Removes a transaction and every transaction that (transitively)
	/// spends one of its outputs, per `Wallet::RemoveTransaction`.
	pub fn remove_transaction(&self, hash: &U256, notify_user: bool) {
		let mut removed = Vec::new();
		{
			let mut state = self.state.lock().unwrap();
			remove_transaction_recursive(&mut state, hash, &mut removed);
		}
		for removed_hash in &removed {
			self.with_listener(|l| l.on_tx_deleted(removed_hash, notify_user, false));
		}
	}

	/// Rewinds every transaction confirmed above `height` back to
	/// unconfirmed, used when a reorg invalidates recently-mined blocks.
	/// Mirrors `Wallet::SetTxUnconfirmedAfter`.
	pub fn set_tx_unconfirmed_after(&self, height: u32) {
		let mut updated = false;
		let mut coinbase_updated = Vec::new();
		let mut restored_coinbase = Vec::new();
		{
			let mut state = self.state.lock().unwrap();
			let hashes: Vec<U256> = state
				.tx_order
				.iter()
				.filter(|h| state.all_tx.get(h).map(|t| t.block_height > height).unwrap_or(false))
				.cloned()
				.collect();
			for hash in hashes {
				if let Some(mut tx) = state.all_tx.get(&hash).cloned() {
					restored_coinbase.extend(reverse_confirmed_effects(&mut state, &tx));
					tx.block_height = ::TX_UNCONFIRMED;
					for input in &tx.inputs {
						state.spending_outputs.insert((input.tx_hash, input.index));
					}
					state.all_tx.insert(tx);
					updated = true;
				}
			}

			let coinbase_hashes: Vec<U256> = state
				.coinbase_tx
				.iter()
				.filter(|t| t.block_height > height)
				.map(|t| t.hash())
				.collect();
			for hash in coinbase_hashes {
				if let Some(mut tx) = state.coinbase_tx.get(&hash).cloned() {
					restored_coinbase.extend(reverse_confirmed_effects(&mut state, &tx));
					tx.block_height = ::TX_UNCONFIRMED;
					state.coinbase_tx.insert(tx);
					coinbase_updated.push(hash);
				}
			}
		}
		if updated {
			self.with_listener(|l| l.on_tx_updated_all());
		}
		if !coinbase_updated.is_empty() {
			self.with_listener(|l| l.on_coinbase_tx_updated(&coinbase_updated, ::TX_UNCONFIRMED, 0));
		}
		if !restored_coinbase.is_empty() {
			let hashes: Vec<U256> = restored_coinbase.iter().map(|u| u.tx_hash).collect();
			self.with_listener(|l| l.on_coinbase_spent(&hashes));
		}
	}
}

fn tx_touches_wallet(state: &WalletState, tx: &Transaction) -> bool {
	tx.outputs.iter().any(|o| state.sub_account.contains_address(&o.address))
		|| tx.inputs.iter().any(|i| prev_output_is_own(state, i.tx_hash, i.index))
}

fn prev_output<'a>(state: &'a WalletState, tx_hash: U256, index: u16) -> Option<&'a ::transaction::TransactionOutput> {
	state
		.all_tx
		.get(&tx_hash)
		.or_else(|| state.coinbase_tx.get(&tx_hash))
		.and_then(|tx| tx.outputs.get(index as usize))
}

fn prev_output_is_own(state: &WalletState, tx_hash: U256, index: u16) -> bool {
	prev_output(state, tx_hash, index)
		.map(|o| state.sub_account.contains_address(&o.address))
		.unwrap_or(false)
}

/// The effect a confirmed transaction had, so callers can fire one
/// `balance_changed` per affected asset and report spent coinbase UTXOs.
#[derive(Default)]
struct ConfirmedEffects {
	affected_assets: HashSet<U256>,
	spent_coinbase: Vec<Utxo>,
}

/// Credits confirmed outputs into their asset's UTXO pool and debits spent
/// inputs out of it. Mirrors `Wallet::BalanceAfterUpdatedTx`.
fn apply_confirmed_effects(state: &mut WalletState, tx: &Transaction) -> ConfirmedEffects {
	let mut effects = ConfirmedEffects::default();
	for input in &tx.inputs {
		state.spending_outputs.remove(&(input.tx_hash, input.index));
		for asset in state.assets.values_mut() {
			if let Some(utxo) = asset.remove_spent_utxo(&input.tx_hash, input.index) {
				effects.affected_assets.insert(utxo.asset_id);
				if utxo.is_coinbase {
					effects.spent_coinbase.push(utxo);
				}
			}
		}
	}
	for output in &tx.outputs {
		if !state.sub_account.contains_address(&output.address) {
			continue;
		}
		if !state.assets.contains_key(&output.asset_id) {
			warn!("tx {} pays an uninstalled asset {}, dropping the output", tx.hash(), output.asset_id);
			continue;
		}
		if let Some(asset) = state.assets.get_mut(&output.asset_id) {
			let vote_contents = match &tx.payload {
				Payload::Vote { contents } => contents.clone(),
				_ => Vec::new(),
			};
			let utxo = Utxo {
				tx_hash: tx.hash(),
				index: output.fixed_index,
				asset_id: output.asset_id,
				amount: output.amount.clone(),
				output_lock: output.output_lock,
				block_height: tx.block_height,
				timestamp: tx.timestamp,
				is_coinbase: tx.is_coinbase(),
				vote_contents,
			};
			if tx.tx_type == TxType::Vote {
				asset.add_vote_utxo(utxo);
			} else {
				asset.add_utxo(utxo);
			}
			effects.affected_assets.insert(output.asset_id);
		}
	}
	effects
}

/// Undoes [`apply_confirmed_effects`], used both by `remove_transaction`
/// and `set_tx_unconfirmed_after`. Mirrors `Wallet::BalanceAfterRemoveTx`.
/// Returns any coinbase UTXOs restored by un-spending this transaction's
/// inputs, reported back to the caller via `coinBaseSpent` just as the
/// reference node reuses that event for the recovery direction.
fn reverse_confirmed_effects(state: &mut WalletState, tx: &Transaction) -> Vec<Utxo> {
	let mut restored_coinbase = Vec::new();
	let tx_hash = tx.hash();
	for output in &tx.outputs {
		if let Some(asset) = state.assets.get_mut(&output.asset_id) {
			asset.remove_spent_utxo(&tx_hash, output.fixed_index);
		}
	}
	for input in &tx.inputs {
		if let Some(out) = prev_output(state, input.tx_hash, input.index).cloned() {
			if state.sub_account.contains_address(&out.address) {
				let creating_tx = state
					.all_tx
					.get(&input.tx_hash)
					.or_else(|| state.coinbase_tx.get(&input.tx_hash));
				let prev_height = creating_tx
					.map(|t| (t.block_height, t.timestamp, t.is_coinbase()))
					.unwrap_or((::TX_UNCONFIRMED, 0, false));
				let was_vote = creating_tx.map(|t| t.tx_type == TxType::Vote).unwrap_or(false);
				let vote_contents = match creating_tx.map(|t| &t.payload) {
					Some(Payload::Vote { contents }) => contents.clone(),
					_ => Vec::new(),
				};
				let restored = Utxo {
					tx_hash: input.tx_hash,
					index: input.index,
					asset_id: out.asset_id,
					amount: out.amount.clone(),
					output_lock: out.output_lock,
					block_height: prev_height.0,
					timestamp: prev_height.1,
					is_coinbase: prev_height.2,
					vote_contents,
				};
				if let Some(asset) = state.assets.get_mut(&out.asset_id) {
					if restored.is_coinbase {
						restored_coinbase.push(restored.clone());
					}
					if was_vote {
						asset.add_vote_utxo(restored);
					} else {
						asset.add_utxo(restored);
					}
				}
			}
		}
	}
	restored_coinbase
}

fn remove_transaction_recursive(state: &mut WalletState, hash: &U256, removed: &mut Vec<U256>) {
	if removed.contains(hash) {
		return;
	}
	let dependents: Vec<U256> = state
		.tx_order
		.iter()
		.filter(|h| {
			state
				.all_tx
				.get(h)
				.map(|t| t.inputs.iter().any(|i| &i.tx_hash == hash))
				.unwrap_or(false)
		})
		.cloned()
		.collect();
	for dep in dependents {
		remove_transaction_recursive(state, &dep, removed);
	}

	if let Some(tx) = state.all_tx.remove_hash(hash) {
		reverse_confirmed_effects(state, &tx);
		for input in &tx.inputs {
			state.spending_outputs.remove(&(input.tx_hash, input.index));
		}
		state.tx_order.retain(|h| h != hash);
		removed.push(*hash);
	}
}

/// Inserts `tx` into `tx_order` keeping ascending order: confirmation
/// height first, then input-dependency (a spender always sorts after what
/// it spends), then chain-index as a final deterministic tie-break.
/// Mirrors `Wallet::InsertTx`/`TxCompare`/`TxIsAscending`.
fn insert_tx_ascending(state: &mut WalletState, tx: Transaction) {
	let hash = tx.hash();
	let pos = state
		.tx_order
		.iter()
		.position(|existing| {
			let existing_tx = state.all_tx.get(existing).expect("tx_order entries always exist in all_tx");
			tx_compare(state, &tx, existing_tx) == Ordering::Less
		})
		.unwrap_or(state.tx_order.len());
	state.tx_order.insert(pos, hash);
	state.all_tx.insert(tx);
}

fn tx_compare(state: &WalletState, a: &Transaction, b: &Transaction) -> Ordering {
	if tx_is_ascending(a, b) {
		return Ordering::Less;
	}
	if tx_is_ascending(b, a) {
		return Ordering::Greater;
	}
	a.block_height.cmp(&b.block_height).then_with(|| chain_index_tiebreak(state, a, b))
}

/// Whether `a` must sort before `b`: either `b` directly spends one of
/// `a`'s outputs, or `a` is confirmed strictly earlier than `b`.
fn tx_is_ascending(a: &Transaction, b: &Transaction) -> bool {
	if b.inputs.iter().any(|i| i.tx_hash == a.hash()) {
		return true;
	}
	if a.block_height != ::TX_UNCONFIRMED && b.block_height != ::TX_UNCONFIRMED {
		return a.block_height < b.block_height;
	}
	false
}

fn chain_index_tiebreak(state: &WalletState, a: &Transaction, b: &Transaction) -> Ordering {
	first_own_chain_index(state, a).cmp(&first_own_chain_index(state, b))
}

fn first_own_chain_index(state: &WalletState, tx: &Transaction) -> (u8, u32) {
	for output in &tx.outputs {
		if let Some((chain, index)) = state.sub_account.chain_index_of(&output.address) {
			let chain_tag = match chain {
				Chain::External => 0,
				Chain::Internal => 1,
			};
			return (chain_tag, index);
		}
	}
	(2, 0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use address::Prefix;
	use bitcoin::util::bip32;
	use config::ChainId;
	use hdkeychain::HDKeyChain;
	use std::str::FromStr;
	use transaction::{Payload, TransactionInput, TransactionOutput, TxType};

	fn test_wallet() -> Wallet {
		let xpub = bip32::ExtendedPubKey::from_str(
			"xpub661MyMwAqRbcFtXgS5sYJABqqG9YLHgvj3vNCa9bimJQQtnZpnXaTWmaW5aXYY3kpW9X4LX8rFGSVsqZqMgb5CQ1oUHrYjpNNbJD11JFcMw",
		)
		.unwrap();
		let fp = xpub.parent_fingerprint;
		let chain = HDKeyChain::new(xpub, fp);
		let sub_account = SubAccount::single_signature(Some(chain), Prefix::Standard, 10, 5).unwrap();
		let config = WalletConfig::new(ChainId::Main, "test".to_string());
		let wallet = Wallet::new(config, sub_account);
		wallet.install_default_asset();
		wallet
	}

	fn coinbase_tx(to: Address, amount: u64, height: u32) -> Transaction {
		Transaction {
			version: 9,
			tx_type: TxType::CoinBase,
			payload_version: 0,
			payload: Payload::CoinBase { coinbase_data: vec![] },
			inputs: vec![TransactionInput {
				tx_hash: U256::ZERO,
				index: 0xFFFF,
				sequence: 0,
			}],
			outputs: vec![TransactionOutput {
				asset_id: Asset::ela_id(),
				amount: BigInt::from_u64(amount),
				address: to,
				output_lock: 0,
				fixed_index: 0,
			}],
			attributes: Vec::new(),
			programs: Vec::new(),
			lock_time: 0,
			block_height: height,
			timestamp: 0,
			fee: BigInt::zero(),
		}
	}

	#[test]
	fn coinbase_output_is_immature_until_maturity_window() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let tx = coinbase_tx(addr, 5_000_000_000, 100);
		wallet.register_transaction(tx).unwrap();
		wallet.set_chain_height(150);
		assert!(wallet.get_balance(&Asset::ela_id()).is_zero());
		wallet.set_chain_height(199);
		assert!(wallet.get_balance(&Asset::ela_id()).is_zero());
		wallet.set_chain_height(200);
		assert!(!wallet.get_balance(&Asset::ela_id()).is_zero());
	}

	#[test]
	fn duplicate_registration_is_a_no_op() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let tx = coinbase_tx(addr, 1_000, 10);
		assert!(wallet.register_transaction(tx.clone()).unwrap());
		assert!(!wallet.register_transaction(tx).unwrap());
	}

	#[test]
	fn reorg_rewinds_confirmed_spend_back_to_unconfirmed() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let tx = coinbase_tx(addr, 5_000_000_000, 10);
		wallet.register_transaction(tx).unwrap();
		wallet.set_chain_height(120);
		assert!(!wallet.get_balance(&Asset::ela_id()).is_zero());

		wallet.set_tx_unconfirmed_after(5);
		assert!(wallet.get_balance(&Asset::ela_id()).is_zero());
	}

	#[test]
	fn strip_drops_non_wallet_outputs_but_keeps_fixed_index() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let other = Address::from_pubkey(Prefix::Standard, &[0x09u8; 33]);
		let tx = Transaction {
			version: 9,
			tx_type: TxType::TransferAsset,
			payload_version: 0,
			payload: Payload::TransferAsset,
			inputs: vec![TransactionInput {
				tx_hash: U256::from_bytes(&[1u8; 32]).unwrap(),
				index: 0,
				sequence: 0xFFFF_FFFF,
			}],
			outputs: (0..5)
				.map(|i| TransactionOutput {
					asset_id: Asset::ela_id(),
					amount: BigInt::from_u64(1_000),
					address: if i == 3 { addr } else { other },
					output_lock: 0,
					fixed_index: i as u16,
				})
				.collect(),
			attributes: Vec::new(),
			programs: Vec::new(),
			lock_time: 0,
			block_height: 10,
			timestamp: 0,
			fee: BigInt::zero(),
		};
		let stripped = wallet.strip_transaction(&tx);
		assert_eq!(stripped.outputs.len(), 1);
		assert_eq!(stripped.outputs[0].fixed_index, 3);
		assert_eq!(stripped.outputs[0].address, addr);
	}

	#[test]
	fn strip_is_a_no_op_when_an_own_input_is_spent() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let coinbase = coinbase_tx(addr, 5_000_000_000, 1);
		wallet.register_transaction(coinbase.clone()).unwrap();
		wallet.set_chain_height(200);

		let other = Address::from_pubkey(Prefix::Standard, &[0x09u8; 33]);
		let tx = Transaction {
			version: 9,
			tx_type: TxType::TransferAsset,
			payload_version: 0,
			payload: Payload::TransferAsset,
			inputs: vec![TransactionInput {
				tx_hash: coinbase.hash(),
				index: 0,
				sequence: 0xFFFF_FFFF,
			}],
			outputs: vec![
				TransactionOutput {
					asset_id: Asset::ela_id(),
					amount: BigInt::from_u64(1_000),
					address: other,
					output_lock: 0,
					fixed_index: 0,
				},
				TransactionOutput {
					asset_id: Asset::ela_id(),
					amount: BigInt::from_u64(2_000),
					address: addr,
					output_lock: 0,
					fixed_index: 1,
				},
			],
			attributes: Vec::new(),
			programs: Vec::new(),
			lock_time: 0,
			block_height: 10,
			timestamp: 0,
			fee: BigInt::zero(),
		};
		let stripped = wallet.strip_transaction(&tx);
		assert_eq!(stripped.outputs.len(), 2);
	}

	#[test]
	fn create_tx_for_outputs_spends_matured_coinbase() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		wallet.register_transaction(coinbase_tx(addr, 5_000_000_000, 1)).unwrap();
		wallet.set_chain_height(200);

		let target = TxOutputTarget {
			address: Address::from_pubkey(Prefix::Standard, &[0x09u8; 33]),
			amount: BigInt::from_u64(1_000_000_000),
		};
		let tx = wallet.create_tx_for_outputs(&Asset::ela_id(), &[target]).unwrap();
		assert_eq!(tx.inputs.len(), 1);
		assert_eq!(tx.outputs[0].amount, BigInt::from_u64(1_000_000_000));
	}

	#[test]
	fn consolidate_requires_an_installed_asset() {
		let wallet = test_wallet();
		let unknown = U256::from_bytes(&[0xAAu8; 32]).unwrap();
		assert!(wallet.consolidate(&unknown, 5).is_err());
	}

	#[test]
	fn signed_info_reports_completeness_against_threshold() {
		let wallet = test_wallet();
		let (signers, complete) = wallet.signed_info(1);
		assert_eq!(signers, 1);
		assert!(complete);
	}

	#[test]
	fn owner_and_cr_deposit_addresses_are_exposed_and_distinct() {
		let wallet = test_wallet();
		let owner = wallet.get_owner_deposit_address().unwrap();
		let cr = wallet.get_cr_owner_deposit_address().unwrap();
		assert_ne!(owner, cr);
	}

	#[test]
	fn get_all_transactions_reflects_registration_order() {
		let wallet = test_wallet();
		let addr = wallet.receive_address().unwrap();
		let coinbase = coinbase_tx(addr, 5_000_000_000, 1);
		wallet.register_transaction(coinbase).unwrap();
		wallet.set_chain_height(200);
		assert!(wallet.get_all_coinbase_transactions().len() == 1);
		assert!(wallet.get_all_transactions().is_empty());
		assert_eq!(wallet.get_all_assets(), vec![Asset::ela_id()]);
	}

	#[derive(Default)]
	struct RecordingListener {
		coinbase_added: Mutex<u32>,
		assets_registered: Mutex<Vec<U256>>,
	}

	impl WalletListener for RecordingListener {
		fn on_coinbase_tx_added(&self, _tx: &Transaction) {
			*self.coinbase_added.lock().unwrap() += 1;
		}

		fn on_asset_registered(&self, asset_id: &U256, _amount: &BigInt, _controller: &::uint::U168) {
			self.assets_registered.lock().unwrap().push(*asset_id);
		}
	}

	#[test]
	fn registering_a_coinbase_tx_fires_the_coinbase_specific_event() {
		use std::sync::Arc;

		let wallet = test_wallet();
		let listener = Arc::new(RecordingListener::default());
		wallet.set_listener(Arc::downgrade(&listener));

		let addr = wallet.receive_address().unwrap();
		wallet.register_transaction(coinbase_tx(addr, 1_000, 10)).unwrap();
		assert_eq!(*listener.coinbase_added.lock().unwrap(), 1);
	}

	#[test]
	fn confirming_a_register_asset_tx_installs_the_asset_and_notifies() {
		use std::sync::Arc;

		let wallet = test_wallet();
		let listener = Arc::new(RecordingListener::default());
		wallet.set_listener(Arc::downgrade(&listener));

		let addr = wallet.receive_address().unwrap();
		let register_tx = Transaction {
			version: 9,
			tx_type: TxType::RegisterAsset,
			payload_version: 0,
			payload: Payload::RegisterAsset {
				asset: Asset::ela(),
				amount: 1_000_000,
				controller: ::uint::U168::ZERO,
			},
			inputs: Vec::new(),
			outputs: vec![TransactionOutput {
				asset_id: Asset::ela_id(),
				amount: BigInt::zero(),
				address: addr,
				output_lock: 0,
				fixed_index: 0,
			}],
			attributes: Vec::new(),
			programs: vec![::transaction::Program {
				code: vec![0x21, 0x02],
				parameter: vec![0x47, 0x30],
			}],
			lock_time: 0,
			block_height: ::TX_UNCONFIRMED,
			timestamp: 0,
			fee: BigInt::zero(),
		};
		let asset_id = register_tx.hash();
		wallet.register_transaction(register_tx).unwrap();
		assert!(!wallet.get_all_assets().contains(&asset_id));

		wallet.update_transactions(&[asset_id], 10, 0);
		assert!(wallet.get_all_assets().contains(&asset_id));
		assert_eq!(*listener.assets_registered.lock().unwrap(), vec![asset_id]);
	}
}
