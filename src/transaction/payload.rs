//! Transaction payload variants, grounded in
//! `original_source/SDK/Plugin/Transaction/Payload/*` (`PayloadRegisterAsset`,
//! `PayloadTransferCrossChainAsset`, `PayloadVote`, `PayloadCRCProposal`,
//! `PayloadReturnDepositCoin`). The reference node dispatches these through
//! a polymorphic registry keyed by `TxType`; since the set of payload kinds
//! this wallet needs to understand is closed, a tagged enum plays the same
//! role without a trait-object registry.

use serde::{Deserialize, Serialize};

use bytestream::{Reader, Writer};
use error::{Error, Result};
use uint::{U168, U256};

/// Asset precision and supply-control metadata carried by a
/// `RegisterAsset` transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
	pub name: String,
	pub description: String,
	pub precision: u8,
	pub asset_type: u8,
}

impl Asset {
	/// The well-known native asset id every chain's default `GroupedAsset`
	/// is keyed by.
	pub fn ela_id() -> U256 {
		U256::ZERO
	}

	/// The well-known native asset every chain carries by default.
	pub fn ela() -> Asset {
		Asset {
			name: "ELA".to_string(),
			description: "Elastos".to_string(),
			precision: 8,
			asset_type: 0,
		}
	}

	pub fn serialize(&self, w: &mut Writer) {
		w.write_var_bytes(self.name.as_bytes());
		w.write_var_bytes(self.description.as_bytes());
		w.write_u8(self.precision);
		w.write_u8(self.asset_type);
	}

	pub fn deserialize(r: &mut Reader) -> Result<Asset> {
		let name = read_string(r)?;
		let description = read_string(r)?;
		let precision = r.read_u8().ok_or_else(underrun)?;
		let asset_type = r.read_u8().ok_or_else(underrun)?;
		Ok(Asset {
			name,
			description,
			precision,
			asset_type,
		})
	}
}

/// One CR-council proposal vote target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteContent {
	pub vote_type: u8,
	pub candidates: Vec<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
	CoinBase { coinbase_data: Vec<u8> },
	TransferAsset,
	RegisterAsset { asset: Asset, amount: u64, controller: U168 },
	TransferCrossChainAsset { cross_chain_addresses: Vec<String>, output_indexes: Vec<u16>, cross_chain_amounts: Vec<u64> },
	WithdrawFromSideChain { blockchain_height: u32, genesis_block_address: String, side_chain_transaction_hashes: Vec<String> },
	Vote { contents: Vec<VoteContent> },
	/// CR-council proposal. `cr_sponsor_did` is only present at payload
	/// versions >= 1 (spec.md §6.3), mirroring
	/// `PayloadCRCProposal::DeserializeUnsigned`'s version gate.
	CrcProposal { proposal_type: u16, sponsor_public_key: Vec<u8>, cr_sponsor_did: Option<U168> },
	ReturnDepositCoin,
}

fn underrun() -> Error {
	Error::InvalidArgument("transaction payload truncated".to_string())
}

fn read_string(r: &mut Reader) -> Result<String> {
	let bytes = r.read_var_bytes().ok_or_else(underrun)?;
	String::from_utf8(bytes).map_err(|e| Error::InvalidArgument(format!("payload string is not utf8: {}", e)))
}

impl Payload {
	pub fn serialize(&self, w: &mut Writer, payload_version: u8) {
		match self {
			Payload::CoinBase { coinbase_data } => {
				w.write_var_bytes(coinbase_data);
			}
			Payload::TransferAsset => {}
			Payload::RegisterAsset { asset, amount, controller } => {
				asset.serialize(w);
				w.write_u64(*amount);
				w.write_bytes(controller.as_bytes());
			}
			Payload::TransferCrossChainAsset {
				cross_chain_addresses,
				output_indexes,
				cross_chain_amounts,
			} => {
				w.write_var_uint(cross_chain_addresses.len() as u64);
				for (addr, (idx, amount)) in cross_chain_addresses
					.iter()
					.zip(output_indexes.iter().zip(cross_chain_amounts.iter()))
				{
					w.write_var_bytes(addr.as_bytes());
					w.write_u16(*idx);
					w.write_u64(*amount);
				}
			}
			Payload::WithdrawFromSideChain {
				blockchain_height,
				genesis_block_address,
				side_chain_transaction_hashes,
			} => {
				w.write_u32(*blockchain_height);
				w.write_var_bytes(genesis_block_address.as_bytes());
				w.write_var_uint(side_chain_transaction_hashes.len() as u64);
				for hash in side_chain_transaction_hashes {
					w.write_var_bytes(hash.as_bytes());
				}
			}
			Payload::Vote { contents } => {
				w.write_var_uint(contents.len() as u64);
				for content in contents {
					w.write_u8(content.vote_type);
					w.write_var_uint(content.candidates.len() as u64);
					for candidate in &content.candidates {
						w.write_var_bytes(candidate);
					}
				}
			}
			Payload::CrcProposal {
				proposal_type,
				sponsor_public_key,
				cr_sponsor_did,
			} => {
				w.write_u16(*proposal_type);
				w.write_var_bytes(sponsor_public_key);
				if payload_version >= 1 {
					// deserialize always reads a DID once payload_version >= 1, so the
					// field must be written unconditionally to keep the wire symmetric.
					let did = cr_sponsor_did.unwrap_or(U168::ZERO);
					w.write_bytes(did.as_bytes());
				}
			}
			Payload::ReturnDepositCoin => {}
		}
	}

	pub fn deserialize(r: &mut Reader, tx_type: super::TxType, payload_version: u8) -> Result<Payload> {
		Ok(match tx_type {
			super::TxType::CoinBase => Payload::CoinBase {
				coinbase_data: r.read_var_bytes().ok_or_else(underrun)?,
			},
			super::TxType::TransferAsset => Payload::TransferAsset,
			super::TxType::RegisterAsset => {
				let asset = Asset::deserialize(r)?;
				let amount = r.read_u64().ok_or_else(underrun)?;
				let controller = U168::from_bytes(&r.read_bytes(U168::LEN).ok_or_else(underrun)?)?;
				Payload::RegisterAsset { asset, amount, controller }
			}
			super::TxType::TransferCrossChain => {
				let count = r.read_var_uint().ok_or_else(underrun)? as usize;
				let mut cross_chain_addresses = Vec::with_capacity(count);
				let mut output_indexes = Vec::with_capacity(count);
				let mut cross_chain_amounts = Vec::with_capacity(count);
				for _ in 0..count {
					cross_chain_addresses.push(read_string(r)?);
					output_indexes.push(r.read_u16().ok_or_else(underrun)?);
					cross_chain_amounts.push(r.read_u64().ok_or_else(underrun)?);
				}
				Payload::TransferCrossChainAsset {
					cross_chain_addresses,
					output_indexes,
					cross_chain_amounts,
				}
			}
			super::TxType::WithdrawFromSideChain => {
				let blockchain_height = r.read_u32().ok_or_else(underrun)?;
				let genesis_block_address = read_string(r)?;
				let count = r.read_var_uint().ok_or_else(underrun)? as usize;
				let mut hashes = Vec::with_capacity(count);
				for _ in 0..count {
					hashes.push(read_string(r)?);
				}
				Payload::WithdrawFromSideChain {
					blockchain_height,
					genesis_block_address,
					side_chain_transaction_hashes: hashes,
				}
			}
			super::TxType::Vote => {
				let count = r.read_var_uint().ok_or_else(underrun)? as usize;
				let mut contents = Vec::with_capacity(count);
				for _ in 0..count {
					let vote_type = r.read_u8().ok_or_else(underrun)?;
					let candidate_count = r.read_var_uint().ok_or_else(underrun)? as usize;
					let mut candidates = Vec::with_capacity(candidate_count);
					for _ in 0..candidate_count {
						candidates.push(r.read_var_bytes().ok_or_else(underrun)?);
					}
					contents.push(VoteContent { vote_type, candidates });
				}
				Payload::Vote { contents }
			}
			super::TxType::RegisterProducer | super::TxType::CancelProducer | super::TxType::CrcProposal => {
				let proposal_type = r.read_u16().ok_or_else(underrun)?;
				let sponsor_public_key = r.read_var_bytes().ok_or_else(underrun)?;
				let cr_sponsor_did = if payload_version >= 1 {
					Some(U168::from_bytes(&r.read_bytes(U168::LEN).ok_or_else(underrun)?)?)
				} else {
					None
				};
				Payload::CrcProposal {
					proposal_type,
					sponsor_public_key,
					cr_sponsor_did,
				}
			}
			super::TxType::ReturnDepositCoin => Payload::ReturnDepositCoin,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn register_asset_round_trips() {
		let payload = Payload::RegisterAsset {
			asset: Asset::ela(),
			amount: 3_300_000_000_00000000,
			controller: U168::from_bytes(&[7u8; 21]).unwrap(),
		};
		let mut w = Writer::new();
		payload.serialize(&mut w, 0);
		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		let back = Payload::deserialize(&mut r, super::super::TxType::RegisterAsset, 0).unwrap();
		assert_eq!(payload, back);
	}

	#[test]
	fn crc_proposal_round_trips_with_absent_sponsor_did_at_version_one() {
		let payload = Payload::CrcProposal {
			proposal_type: 1,
			sponsor_public_key: vec![1, 2, 3],
			cr_sponsor_did: None,
		};
		let mut w = Writer::new();
		payload.serialize(&mut w, 1);
		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		let back = Payload::deserialize(&mut r, super::super::TxType::CrcProposal, 1).unwrap();
		assert_eq!(
			back,
			Payload::CrcProposal {
				proposal_type: 1,
				sponsor_public_key: vec![1, 2, 3],
				cr_sponsor_did: Some(U168::ZERO),
			}
		);
	}

	#[test]
	fn vote_payload_round_trips() {
		let payload = Payload::Vote {
			contents: vec![VoteContent {
				vote_type: 0,
				candidates: vec![vec![1, 2, 3], vec![4, 5]],
			}],
		};
		let mut w = Writer::new();
		payload.serialize(&mut w, 0);
		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		let back = Payload::deserialize(&mut r, super::super::TxType::Vote, 0).unwrap();
		assert_eq!(payload, back);
	}
}
