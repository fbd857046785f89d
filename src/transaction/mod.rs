//! Transaction model, grounded in `original_source/SDK/Plugin/Transaction/
//! Transaction.cpp`. A transaction hashes and signs over its
//! inputs/outputs/attributes/payload but excludes its `programs` (the
//! signature scripts themselves, added after the signing digest is fixed),
//! so two serialization flavours are kept: [`Transaction::serialize`] (full
//! wire form) and [`Transaction::digest`] (signing/id form).

pub mod payload;

use bitcoin_hashes::{sha256d, Hash};
use serde::{Deserialize, Serialize};

use address::Address;
use bigint::BigInt;
use bytestream::{Reader, Writer};
use element_set::Hashable;
use error::{Error, Result};
use uint::U256;

pub use self::payload::{Asset, Payload, VoteContent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
	CoinBase,
	TransferAsset,
	RegisterAsset,
	TransferCrossChain,
	WithdrawFromSideChain,
	RegisterProducer,
	CancelProducer,
	Vote,
	CrcProposal,
	ReturnDepositCoin,
}

impl TxType {
	fn tag(self) -> u8 {
		match self {
			TxType::CoinBase => 0x00,
			TxType::RegisterAsset => 0x01,
			TxType::TransferAsset => 0x02,
			TxType::RegisterProducer => 0x09,
			TxType::CancelProducer => 0x0C,
			TxType::Vote => 0x0D,
			TxType::WithdrawFromSideChain => 0x03,
			TxType::TransferCrossChain => 0x04,
			TxType::CrcProposal => 0x1A,
			TxType::ReturnDepositCoin => 0x1E,
		}
	}

	fn from_tag(tag: u8) -> Result<TxType> {
		Ok(match tag {
			0x00 => TxType::CoinBase,
			0x01 => TxType::RegisterAsset,
			0x02 => TxType::TransferAsset,
			0x09 => TxType::RegisterProducer,
			0x0C => TxType::CancelProducer,
			0x0D => TxType::Vote,
			0x03 => TxType::WithdrawFromSideChain,
			0x04 => TxType::TransferCrossChain,
			0x1A => TxType::CrcProposal,
			0x1E => TxType::ReturnDepositCoin,
			_ => return Err(Error::InvalidArgument(format!("unknown tx type tag {:#x}", tag))),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
	pub tx_hash: U256,
	pub index: u16,
	pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
	pub asset_id: U256,
	pub amount: BigInt,
	pub address: Address,
	pub output_lock: u32,
	/// Stable position of this output before any wallet-side stripping
	/// (spec.md §6.6); preserved across [`super::wallet::Wallet`]'s
	/// `strip_transaction`.
	pub fixed_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
	pub usage: u8,
	pub data: Vec<u8>,
}

/// One signature program attached to a transaction: the redeem script plus
/// the concatenated signatures satisfying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
	pub code: Vec<u8>,
	pub parameter: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	pub version: u8,
	pub tx_type: TxType,
	pub payload_version: u8,
	pub payload: Payload,
	pub inputs: Vec<TransactionInput>,
	pub outputs: Vec<TransactionOutput>,
	pub attributes: Vec<Attribute>,
	pub programs: Vec<Program>,
	pub lock_time: u32,
	/// `TX_UNCONFIRMED` while the transaction has not yet been seen in a
	/// block.
	pub block_height: u32,
	pub timestamp: u32,
	pub fee: BigInt,
}

impl Transaction {
	fn serialize_body(&self, w: &mut Writer, with_programs: bool) {
		w.write_u8(self.version);
		w.write_u8(self.tx_type.tag());
		w.write_u8(self.payload_version);
		self.payload.serialize(w, self.payload_version);

		w.write_var_uint(self.attributes.len() as u64);
		for attr in &self.attributes {
			w.write_u8(attr.usage);
			w.write_var_bytes(&attr.data);
		}

		w.write_var_uint(self.inputs.len() as u64);
		for input in &self.inputs {
			w.write_hash(input.tx_hash.as_bytes());
			w.write_u16(input.index);
			w.write_u32(input.sequence);
		}

		w.write_var_uint(self.outputs.len() as u64);
		for output in &self.outputs {
			w.write_hash(output.asset_id.as_bytes());
			w.write_var_bytes(output.amount.to_dec_string().as_bytes());
			w.write_u32(output.output_lock);
			w.write_bytes(output.address.program_hash.as_bytes());
			w.write_u8(output.address.prefix.byte());
		}

		w.write_u32(self.lock_time);

		if with_programs {
			w.write_var_uint(self.programs.len() as u64);
			for program in &self.programs {
				w.write_var_bytes(&program.code);
				w.write_var_bytes(&program.parameter);
			}
		}
	}

	/// Full wire serialization, including signature programs.
	pub fn serialize(&self) -> Vec<u8> {
		let mut w = Writer::new();
		self.serialize_body(&mut w, true);
		w.into_bytes()
	}

	/// Parses the full wire form produced by [`Transaction::serialize`].
	pub fn deserialize(r: &mut Reader) -> Result<Transaction> {
		let underrun = || Error::InvalidArgument("transaction truncated".to_string());

		let version = r.read_u8().ok_or_else(underrun)?;
		let tx_type = TxType::from_tag(r.read_u8().ok_or_else(underrun)?)?;
		let payload_version = r.read_u8().ok_or_else(underrun)?;
		let payload = Payload::deserialize(r, tx_type, payload_version)?;

		let attr_count = r.read_var_uint().ok_or_else(underrun)? as usize;
		let mut attributes = Vec::with_capacity(attr_count);
		for _ in 0..attr_count {
			let usage = r.read_u8().ok_or_else(underrun)?;
			let data = r.read_var_bytes().ok_or_else(underrun)?;
			attributes.push(Attribute { usage, data });
		}

		let input_count = r.read_var_uint().ok_or_else(underrun)? as usize;
		let mut inputs = Vec::with_capacity(input_count);
		for _ in 0..input_count {
			let tx_hash = U256::from_bytes(&r.read_hash(U256::LEN).ok_or_else(underrun)?)?;
			let index = r.read_u16().ok_or_else(underrun)?;
			let sequence = r.read_u32().ok_or_else(underrun)?;
			inputs.push(TransactionInput { tx_hash, index, sequence });
		}

		let output_count = r.read_var_uint().ok_or_else(underrun)? as usize;
		let mut outputs = Vec::with_capacity(output_count);
		for fixed_index in 0..output_count {
			let asset_id = U256::from_bytes(&r.read_hash(U256::LEN).ok_or_else(underrun)?)?;
			let amount_bytes = r.read_var_bytes().ok_or_else(underrun)?;
			let amount_str = String::from_utf8(amount_bytes)
				.map_err(|e| Error::InvalidArgument(format!("output amount is not utf8: {}", e)))?;
			let amount = BigInt::from_dec_str(&amount_str)?;
			let output_lock = r.read_u32().ok_or_else(underrun)?;
			let program_hash = ::uint::U160::from_bytes(&r.read_bytes(::uint::U160::LEN).ok_or_else(underrun)?)?;
			let prefix = ::address::Prefix::from_byte(r.read_u8().ok_or_else(underrun)?)?;
			outputs.push(TransactionOutput {
				asset_id,
				amount,
				address: Address::new(prefix, program_hash),
				output_lock,
				fixed_index: fixed_index as u16,
			});
		}

		let lock_time = r.read_u32().ok_or_else(underrun)?;

		let program_count = r.read_var_uint().ok_or_else(underrun)? as usize;
		let mut programs = Vec::with_capacity(program_count);
		for _ in 0..program_count {
			let code = r.read_var_bytes().ok_or_else(underrun)?;
			let parameter = r.read_var_bytes().ok_or_else(underrun)?;
			programs.push(Program { code, parameter });
		}

		Ok(Transaction {
			version,
			tx_type,
			payload_version,
			payload,
			inputs,
			outputs,
			attributes,
			programs,
			lock_time,
			block_height: ::TX_UNCONFIRMED,
			timestamp: 0,
			fee: BigInt::zero(),
		})
	}

	/// Serialization excluding `programs`, the bytes that get hashed for
	/// both the transaction id and the per-input signing digest.
	pub fn digest_bytes(&self) -> Vec<u8> {
		let mut w = Writer::new();
		self.serialize_body(&mut w, false);
		w.into_bytes()
	}

	/// Double-SHA-256 of the program-excluded serialization.
	pub fn hash(&self) -> U256 {
		let digest = sha256d::Hash::hash(&self.digest_bytes());
		U256(digest.into_inner())
	}

	pub fn is_coinbase(&self) -> bool {
		self.tx_type == TxType::CoinBase
	}

	/// A transaction with no real inputs, only coinbase's dummy input, is
	/// never considered spendable change we own, and is the only tx type
	/// allowed through [`super::wallet::Wallet::register_transaction`]
	/// without any program attached.
	pub fn is_signed(&self) -> bool {
		self.is_coinbase() || !self.programs.is_empty()
	}
}

impl Hashable for Transaction {
	fn element_hash(&self) -> U256 {
		self.hash()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use address::Prefix;

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
				amount: BigInt::from_u64(1_000),
				address: Address::from_pubkey(Prefix::Standard, &[0x02u8; 33]),
				output_lock: 0,
				fixed_index: 0,
			}],
			attributes: Vec::new(),
			programs: Vec::new(),
			lock_time: 0,
			block_height: ::TX_UNCONFIRMED,
			timestamp: 0,
			fee: BigInt::zero(),
		}
	}

	#[test]
	fn hash_is_stable_across_calls() {
		let tx = sample_tx();
		assert_eq!(tx.hash(), tx.hash());
	}

	#[test]
	fn hash_excludes_programs() {
		let mut tx = sample_tx();
		let hash_before = tx.hash();
		tx.programs.push(Program {
			code: vec![1, 2, 3],
			parameter: vec![4, 5, 6],
		});
		assert_eq!(tx.hash(), hash_before);
	}

	#[test]
	fn hash_changes_when_outputs_change() {
		let mut tx = sample_tx();
		let hash_before = tx.hash();
		tx.outputs[0].amount = BigInt::from_u64(2_000);
		assert_ne!(tx.hash(), hash_before);
	}

	#[test]
	fn unsigned_non_coinbase_tx_is_not_signed() {
		let tx = sample_tx();
		assert!(!tx.is_signed());
	}

	#[test]
	fn full_wire_form_round_trips() {
		let mut tx = sample_tx();
		tx.programs.push(Program {
			code: vec![0x21, 0x02],
			parameter: vec![0x47, 0x30],
		});
		let bytes = tx.serialize();
		let mut r = Reader::new(&bytes);
		let back = Transaction::deserialize(&mut r).unwrap();
		assert!(r.is_empty());
		assert_eq!(back.version, tx.version);
		assert_eq!(back.tx_type, tx.tx_type);
		assert_eq!(back.payload, tx.payload);
		assert_eq!(back.inputs, tx.inputs);
		assert_eq!(back.outputs, tx.outputs);
		assert_eq!(back.programs, tx.programs);
		assert_eq!(back.hash(), tx.hash());
	}

	#[test]
	fn deserialize_rejects_truncated_bytes() {
		let bytes = vec![0x09, 0x02];
		let mut r = Reader::new(&bytes);
		assert!(Transaction::deserialize(&mut r).is_err());
	}
}
