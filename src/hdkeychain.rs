//! HD key derivation over a `bip32::ExtendedPubKey`, grounded in
//! `original_source/SDK/WalletCore/HDKeychain.cpp` for the external
//! (`m/0/i`) and internal/change (`m/1/i`) chain convention.

use bitcoin::util::bip32;
use bitcoin::PublicKey;
use serde::{Deserialize, Serialize};

use address::{Address, Prefix};
use error::Result;

/// Which derivation chain an address belongs to (spec.md §5.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Chain {
	External,
	Internal,
}

impl Chain {
	fn child_number(self) -> bip32::ChildNumber {
		match self {
			Chain::External => bip32::ChildNumber::from_normal_idx(0).unwrap(),
			Chain::Internal => bip32::ChildNumber::from_normal_idx(1).unwrap(),
		}
	}
}

/// Wraps an `ExtendedPubKey` and derives addresses along the external and
/// internal chains without ever touching the private key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HDKeyChain {
	extended_pubkey: bip32::ExtendedPubKey,
	master_fingerprint: bip32::Fingerprint,
}

impl HDKeyChain {
	pub fn new(extended_pubkey: bip32::ExtendedPubKey, master_fingerprint: bip32::Fingerprint) -> HDKeyChain {
		HDKeyChain {
			extended_pubkey,
			master_fingerprint,
		}
	}

	pub fn master_fingerprint(&self) -> bip32::Fingerprint {
		self.master_fingerprint
	}

	pub fn public_key_at(&self, chain: Chain, index: u32) -> Result<PublicKey> {
		let path = self.derivation_path(chain, index)?;
		let derived = self.extended_pubkey.derive_pub(&::SECP, &path)?;
		Ok(derived.public_key)
	}

	pub fn address_at(&self, chain: Chain, index: u32, prefix: Prefix) -> Result<Address> {
		let pubkey = self.public_key_at(chain, index)?;
		Ok(Address::from_pubkey(prefix, &pubkey.key.serialize()))
	}

	fn derivation_path(&self, chain: Chain, index: u32) -> Result<bip32::DerivationPath> {
		let child = bip32::ChildNumber::from_normal_idx(index)?;
		let path: bip32::DerivationPath = vec![chain.child_number(), child].into();
		Ok(path)
	}

	/// The dedicated owner-key branch (child index 2, distinct from the
	/// external/internal chains), used for producer/CR-council registration
	/// addresses, per `Account::OwnerPubKey`.
	pub fn owner_public_key(&self) -> Result<PublicKey> {
		self.derive_reserved_branch(2)
	}

	/// The dedicated DID-key branch (child index 3), used for CR-council
	/// owner deposit addresses, per `Account::DIDPubKey`.
	pub fn did_public_key(&self) -> Result<PublicKey> {
		self.derive_reserved_branch(3)
	}

	fn derive_reserved_branch(&self, branch: u32) -> Result<PublicKey> {
		let child = bip32::ChildNumber::from_normal_idx(branch)?;
		let path: bip32::DerivationPath = vec![child].into();
		let derived = self.extended_pubkey.derive_pub(&::SECP, &path)?;
		Ok(derived.public_key)
	}
}
