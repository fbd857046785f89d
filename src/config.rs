//! Wallet configuration: chain selection and the per-chain knobs
//! `original_source/SDK/Wallet/Wallet.cpp` reads off its `SubWallet`/
//! `ChainParams` (gap limits, fee rate, coinbase maturity).

use serde::{Deserialize, Serialize};

use {COINBASE_MATURITY, DEFAULT_FEE_PER_KB, SEQUENCE_GAP_LIMIT_EXTERNAL, SEQUENCE_GAP_LIMIT_INTERNAL};

/// Which auxiliary chain this wallet instance tracks (spec.md §1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
	Main,
	Identity,
	Token,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletConfig {
	pub chain_id: ChainId,
	/// Opaque identifier the host application uses to multiplex several
	/// wallets sharing one storage backend.
	pub wallet_id: String,
	pub fee_per_kb: u64,
	pub gap_limit_external: u32,
	pub gap_limit_internal: u32,
	pub coinbase_maturity: u32,
}

impl WalletConfig {
	pub fn new(chain_id: ChainId, wallet_id: String) -> WalletConfig {
		WalletConfig {
			chain_id,
			wallet_id,
			fee_per_kb: DEFAULT_FEE_PER_KB,
			gap_limit_external: SEQUENCE_GAP_LIMIT_EXTERNAL,
			gap_limit_internal: SEQUENCE_GAP_LIMIT_INTERNAL,
			coinbase_maturity: COINBASE_MATURITY,
		}
	}
}
