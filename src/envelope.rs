//! JSON transaction envelope carried across the SDK boundary, grounded in
//! `original_source/SDK/Implement/SubWallet.cpp`'s `EncodeTx`/`DecodeTx`.
//! The raw transaction bytes are base64-encoded inside a small JSON
//! wrapper so callers can route a transaction through JSON-only channels
//! (e.g. a mobile bridge) without re-implementing the binary codec.

use base64;
use serde::{Deserialize, Serialize};
use serde_json;

use bigint::BigInt;
use error::{Error, Result};
use transaction::Transaction;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
	#[serde(rename = "Algorithm")]
	pub algorithm: String,
	#[serde(rename = "ID")]
	pub id: String,
	#[serde(rename = "Data")]
	pub data: String,
	#[serde(rename = "ChainID")]
	pub chain_id: String,
	#[serde(rename = "Fee")]
	pub fee: BigInt,
}

const ALGORITHM: &str = "base64";

pub fn encode(tx: &Transaction, chain_id: &str) -> Result<String> {
	let hex = tx.hash().to_hex();
	let envelope = Envelope {
		algorithm: ALGORITHM.to_string(),
		id: hex[..8].to_string(),
		data: base64::encode(&tx.serialize()),
		chain_id: chain_id.to_string(),
		fee: tx.fee.clone(),
	};
	serde_json::to_string(&envelope).map_err(|e| Error::JsonArrayError(e.to_string()))
}

pub fn decode(json: &str) -> Result<(Envelope, Vec<u8>)> {
	let envelope: Envelope =
		serde_json::from_str(json).map_err(|e| Error::JsonArrayError(format!("bad envelope json: {}", e)))?;
	let raw = base64::decode(&envelope.data).map_err(|e| Error::InvalidArgument(format!("bad envelope data: {}", e)))?;
	Ok((envelope, raw))
}

#[cfg(test)]
mod tests {
	use super::*;
	use address::{Address, Prefix};
	use transaction::{Payload, TransactionInput, TransactionOutput, TxType};
	use uint::U256;

	fn sample_tx() -> Transaction {
		Transaction {
			version: 9,
			tx_type: TxType::TransferAsset,
			payload_version: 0,
			payload: Payload::TransferAsset,
			inputs: vec![TransactionInput {
				tx_hash: U256::ZERO,
				index: 0,
				sequence: 0xFFFF_FFFF,
			}],
			outputs: vec![TransactionOutput {
				asset_id: U256::ZERO,
				amount: BigInt::from_u64(1),
				address: Address::from_pubkey(Prefix::Standard, &[0x02u8; 33]),
				output_lock: 0,
				fixed_index: 0,
			}],
			attributes: Vec::new(),
			programs: Vec::new(),
			lock_time: 0,
			block_height: ::TX_UNCONFIRMED,
			timestamp: 0,
			fee: BigInt::from_u64(100),
		}
	}

	#[test]
	fn encode_decode_round_trips_the_id() {
		let tx = sample_tx();
		let json = encode(&tx, "ELA").unwrap();
		let (envelope, raw) = decode(&json).unwrap();
		assert_eq!(envelope.id, &tx.hash().to_hex()[..8]);
		assert_eq!(envelope.algorithm, "base64");
		assert_eq!(raw, tx.serialize());
	}
}
