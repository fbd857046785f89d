//! Structured wallet errors (spec.md §7).
//!
//! Mirrors the error categories the reference node reports across the SDK
//! boundary (`ErrorChecker.cpp`'s `Error::InvalidArgument`, `InvalidAsset`,
//! ...), built on `thiserror` the way the corpus crates that report
//! structured domain errors do it (zebra-chain, zebra-network, zebra-state
//! all use `thiserror` for one enum per crate).

use std::result;

use bitcoin::util::bip32;

use bigint::BigInt;

pub type Result<T> = result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("asset not found: {0}")]
	InvalidAsset(String),

	#[error("failed to create transaction: {0}")]
	CreateTransaction(String),

	#[error("insufficient balance: short by {shortfall}")]
	InsufficientBalance { shortfall: BigInt },

	#[error("signing failed: {0}")]
	Sign(String),

	#[error("wallet does not contain transaction: {0}")]
	WalletNotContainTx(String),

	#[error("malformed json array argument: {0}")]
	JsonArrayError(String),

	#[error("path does not exist: {0}")]
	PathNotExist(String),

	#[error("BIP-32 error: {0}")]
	Bip32(String),

	#[error("secp256k1 error: {0}")]
	Secp256k1(String),
}

impl From<bip32::Error> for Error {
	fn from(e: bip32::Error) -> Error {
		Error::Bip32(format!("{:?}", e))
	}
}

impl From<secp256k1::Error> for Error {
	fn from(e: secp256k1::Error) -> Error {
		Error::Secp256k1(e.to_string())
	}
}
