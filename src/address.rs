//! Base58Check addresses over a 168-bit prefix+program-hash payload,
//! grounded in `original_source/SDK/Common/Address.cpp`'s `Address::String`
//! and the reference node's `Prefix` enumeration.

use bitcoin_hashes::{hash160, Hash};
use serde::{Deserialize, Serialize};

use error::{Error, Result};
use uint::U160;

/// Leading byte identifying the kind of program hash an address wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prefix {
	Standard,
	MultiSig,
	CrossChain,
	Deposit,
	IdChain,
	Destroy,
}

impl Prefix {
	pub fn byte(self) -> u8 {
		match self {
			Prefix::Standard => 0x21,
			Prefix::MultiSig => 0x12,
			Prefix::CrossChain => 0x4B,
			Prefix::Deposit => 0x1F,
			Prefix::IdChain => 0x67,
			Prefix::Destroy => 0x00,
		}
	}

	pub fn from_byte(b: u8) -> Result<Prefix> {
		Ok(match b {
			0x21 => Prefix::Standard,
			0x12 => Prefix::MultiSig,
			0x4B => Prefix::CrossChain,
			0x1F => Prefix::Deposit,
			0x67 => Prefix::IdChain,
			0x00 => Prefix::Destroy,
			_ => return Err(Error::InvalidArgument(format!("unknown address prefix byte {:#x}", b))),
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
	pub prefix: Prefix,
	pub program_hash: U160,
}

impl Address {
	pub fn new(prefix: Prefix, program_hash: U160) -> Address {
		Address { prefix, program_hash }
	}

	/// Standard pay-to-pubkey-hash address for an uncompressed/compressed
	/// secp256k1 public key, via the single-signature redeem script
	/// `<pubkey> CHECKSIG` the same way `Address::fromPubKey` builds it.
	pub fn from_pubkey(prefix: Prefix, pubkey: &[u8]) -> Address {
		let redeem_script = single_signature_redeem_script(pubkey);
		let program_hash = hash160::Hash::hash(&redeem_script);
		Address {
			prefix,
			program_hash: U160(program_hash.into_inner()),
		}
	}

	/// Program hash of a multi-signature redeem script, for `m`-of-`n`
	/// accounts (spec.md §5.4).
	pub fn from_multisig_redeem_script(prefix: Prefix, redeem_script: &[u8]) -> Address {
		let program_hash = hash160::Hash::hash(redeem_script);
		Address {
			prefix,
			program_hash: U160(program_hash.into_inner()),
		}
	}

	pub fn from_string(s: &str) -> Result<Address> {
		let payload = bs58::decode(s)
			.with_check(None)
			.into_vec()
			.map_err(|e| Error::InvalidArgument(format!("bad base58check address {:?}: {}", s, e)))?;
		if payload.len() != 1 + U160::LEN {
			return Err(Error::InvalidArgument(format!(
				"address payload has {} bytes, expected {}",
				payload.len(),
				1 + U160::LEN
			)));
		}
		let prefix = Prefix::from_byte(payload[0])?;
		let program_hash = U160::from_bytes(&payload[1..])?;
		Ok(Address { prefix, program_hash })
	}

	pub fn to_string(&self) -> String {
		let mut payload = Vec::with_capacity(1 + U160::LEN);
		payload.push(self.prefix.byte());
		payload.extend_from_slice(self.program_hash.as_bytes());
		bs58::encode(payload).with_check().into_string()
	}
}

impl ::std::fmt::Display for Address {
	fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
		f.write_str(&self.to_string())
	}
}

/// `<33-or-65-byte pubkey> OP_CHECKSIG`, the minimal single-signature
/// template this wallet understands (spec.md §4.4: "not a general script
/// VM").
fn single_signature_redeem_script(pubkey: &[u8]) -> Vec<u8> {
	const OP_CHECKSIG: u8 = 0xAC;
	let mut script = Vec::with_capacity(pubkey.len() + 2);
	script.push(pubkey.len() as u8);
	script.extend_from_slice(pubkey);
	script.push(OP_CHECKSIG);
	script
}

/// `<m> <pubkey1> ... <pubkeyn> <n> OP_CHECKMULTISIG`.
pub fn multisig_redeem_script(m: u8, pubkeys: &[Vec<u8>]) -> Vec<u8> {
	const OP_1_BASE: u8 = 0x50;
	const OP_CHECKMULTISIG: u8 = 0xAE;
	let mut script = Vec::new();
	script.push(OP_1_BASE + m);
	for pk in pubkeys {
		script.push(pk.len() as u8);
		script.extend_from_slice(pk);
	}
	script.push(OP_1_BASE + pubkeys.len() as u8);
	script.push(OP_CHECKMULTISIG);
	script
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pubkey_address_round_trips_through_string() {
		let pubkey = [0x02u8; 33];
		let addr = Address::from_pubkey(Prefix::Standard, &pubkey);
		let s = addr.to_string();
		let back = Address::from_string(&s).unwrap();
		assert_eq!(addr, back);
		assert_eq!(back.prefix, Prefix::Standard);
	}

	#[test]
	fn corrupted_checksum_is_rejected() {
		let pubkey = [0x03u8; 33];
		let addr = Address::from_pubkey(Prefix::Standard, &pubkey);
		let mut s = addr.to_string();
		s.pop();
		s.push(if s.ends_with('1') { '2' } else { '1' });
		assert!(Address::from_string(&s).is_err());
	}

	#[test]
	fn different_prefixes_yield_different_addresses_for_same_key() {
		let pubkey = [0x04u8; 33];
		let standard = Address::from_pubkey(Prefix::Standard, &pubkey);
		let idchain = Address::from_pubkey(Prefix::IdChain, &pubkey);
		assert_eq!(standard.program_hash, idchain.program_hash);
		assert_ne!(standard.to_string(), idchain.to_string());
	}
}
