//! Persistence interface the wallet core relies on, grounded in
//! `original_source/SDK/Database/CoinBaseUTXODataStore.cpp`'s `Put`/`Update`/
//! `Delete`/`DoTransaction` pattern. This crate does not ship a concrete SQL
//! backend (spec.md §12 Non-goals); it only defines the trait surface
//! `Wallet` drives so a host application can plug in sqlite, sled, or
//! whatever it already uses elsewhere.

use error::Result;
use transaction::Transaction;
use uint::U256;
use utxo::Utxo;

/// A single atomic batch of storage writes. Implementations typically wrap
/// a database transaction opened `IMMEDIATE` so a crash mid-batch can never
/// leave the wallet's on-disk and in-memory views inconsistent.
pub trait StorageTransaction {
	fn commit(self: Box<Self>) -> Result<()>;
	fn rollback(self: Box<Self>) -> Result<()>;
}

pub trait WalletStore: Send + Sync {
	fn begin_transaction(&self) -> Result<Box<dyn StorageTransaction>>;

	fn put_transaction(&self, tx: &Transaction) -> Result<()>;
	fn get_transaction(&self, hash: &U256) -> Result<Option<Transaction>>;
	fn get_all_transactions(&self) -> Result<Vec<Transaction>>;
	fn delete_transaction(&self, hash: &U256) -> Result<()>;
	fn update_transaction_height(&self, hash: &U256, block_height: u32, timestamp: u32) -> Result<()>;

	fn put_utxo(&self, utxo: &Utxo) -> Result<()>;
	fn get_all_utxos(&self) -> Result<Vec<Utxo>>;
	fn delete_utxo(&self, tx_hash: &U256, index: u16) -> Result<()>;

	fn put_coinbase_utxo(&self, utxo: &Utxo) -> Result<()>;
	fn get_all_coinbase_utxos(&self) -> Result<Vec<Utxo>>;
	fn update_coinbase_spent(&self, hashes: &[U256], spent: bool) -> Result<()>;
	fn delete_coinbase_utxo(&self, tx_hash: &U256, index: u16) -> Result<()>;
}
