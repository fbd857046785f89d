//! Account surface above an [`HDKeyChain`]: gap-limit address discovery,
//! multi-signature cosigning and the DID branch, grounded in
//! `original_source/SDK/Account/Account.h`/`SubAccount.cpp`.

use serde::{Deserialize, Serialize};

use address::{multisig_redeem_script, Address, Prefix};
use error::{Error, Result};
use hdkeychain::{Chain, HDKeyChain};
use MAX_MULTISIG_COSIGNERS;

/// How many signatures a single-address account produces per signing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignType {
	Single,
	MultiSign { m: u8, n: u8 },
}

/// One used address slot and whether it has ever received a payment,
/// mirroring the gap-limit bookkeeping the reference node keeps per chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct UsedAddress {
	index: u32,
	address: Address,
	used: bool,
}

/// A single cosigner's extended public key and the name of the internal
/// chain it contributes to a multi-signature redeem script.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cosigner {
	pub key_chain: HDKeyChain,
	/// Position among the `n` cosigners; used to break signing-order ties.
	pub index: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubAccount {
	own_chain: Option<HDKeyChain>,
	cosigners: Vec<Cosigner>,
	m: u8,
	single_address: Option<Address>,
	prefix: Prefix,
	gap_limit_external: u32,
	gap_limit_internal: u32,
	external: Vec<UsedAddress>,
	internal: Vec<UsedAddress>,
}

impl SubAccount {
	pub fn single_signature(
		own_chain: Option<HDKeyChain>,
		prefix: Prefix,
		gap_limit_external: u32,
		gap_limit_internal: u32,
	) -> Result<SubAccount> {
		let mut account = SubAccount {
			own_chain,
			cosigners: Vec::new(),
			m: 1,
			single_address: None,
			prefix,
			gap_limit_external,
			gap_limit_internal,
			external: Vec::new(),
			internal: Vec::new(),
		};
		account.fill_gap(Chain::External)?;
		account.fill_gap(Chain::Internal)?;
		Ok(account)
	}

	/// A fixed single address that never rotates, used for deposit-only
	/// or read-only watch accounts.
	pub fn single_address(address: Address) -> SubAccount {
		SubAccount {
			own_chain: None,
			cosigners: Vec::new(),
			m: 1,
			single_address: Some(address),
			prefix: address.prefix,
			gap_limit_external: 0,
			gap_limit_internal: 0,
			external: Vec::new(),
			internal: Vec::new(),
		}
	}

	/// `m`-of-`n` multi-signature account. `own_chain` must also appear as
	/// one of `cosigners` (spec.md §5.4: additive signing over all
	/// cosigners, ordered by `index`).
	pub fn multi_signature(
		own_chain: Option<HDKeyChain>,
		cosigners: Vec<Cosigner>,
		m: u8,
		prefix: Prefix,
		gap_limit_external: u32,
		gap_limit_internal: u32,
	) -> Result<SubAccount> {
		if cosigners.len() > MAX_MULTISIG_COSIGNERS {
			return Err(Error::InvalidArgument(format!(
				"multi-sign account has {} cosigners, max is {}",
				cosigners.len(),
				MAX_MULTISIG_COSIGNERS
			)));
		}
		if m == 0 || usize::from(m) > cosigners.len() {
			return Err(Error::InvalidArgument(format!(
				"invalid m={} for {} cosigners",
				m,
				cosigners.len()
			)));
		}
		let mut account = SubAccount {
			own_chain,
			cosigners,
			m,
			single_address: None,
			prefix,
			gap_limit_external,
			gap_limit_internal,
			external: Vec::new(),
			internal: Vec::new(),
		};
		account.fill_gap(Chain::External)?;
		account.fill_gap(Chain::Internal)?;
		Ok(account)
	}

	pub fn sign_type(&self) -> SignType {
		if self.cosigners.is_empty() {
			SignType::Single
		} else {
			SignType::MultiSign {
				m: self.m,
				n: self.cosigners.len() as u8,
			}
		}
	}

	pub fn get_m(&self) -> u8 {
		self.m
	}

	pub fn get_n(&self) -> u8 {
		self.cosigners.len().max(1) as u8
	}

	fn chain_slots(&self, chain: Chain) -> &Vec<UsedAddress> {
		match chain {
			Chain::External => &self.external,
			Chain::Internal => &self.internal,
		}
	}

	fn chain_slots_mut(&mut self, chain: Chain) -> &mut Vec<UsedAddress> {
		match chain {
			Chain::External => &mut self.external,
			Chain::Internal => &mut self.internal,
		}
	}

	fn gap_limit(&self, chain: Chain) -> u32 {
		match chain {
			Chain::External => self.gap_limit_external,
			Chain::Internal => self.gap_limit_internal,
		}
	}

	fn derive_address(&self, chain: Chain, index: u32) -> Result<Address> {
		if self.cosigners.is_empty() {
			let own_chain = self
				.own_chain
				.as_ref()
				.ok_or_else(|| Error::InvalidArgument("read-only account has no derivation key".into()))?;
			own_chain.address_at(chain, index, self.prefix)
		} else {
			let mut pubkeys: Vec<Vec<u8>> = self
				.cosigners
				.iter()
				.map(|c| c.key_chain.public_key_at(chain, index).map(|pk| pk.key.serialize().to_vec()))
				.collect::<Result<_>>()?;
			pubkeys.sort();
			let redeem_script = multisig_redeem_script(self.m, &pubkeys);
			Ok(Address::from_multisig_redeem_script(self.prefix, &redeem_script))
		}
	}

	/// Derive addresses up to `gap_limit` unused slots past the last used
	/// one, the same discovery window `Account::UnusedAddresses` keeps.
	fn fill_gap(&mut self, chain: Chain) -> Result<()> {
		let gap_limit = self.gap_limit(chain);
		loop {
			let slots = self.chain_slots(chain);
			let trailing_unused = slots.iter().rev().take_while(|s| !s.used).count() as u32;
			if trailing_unused >= gap_limit {
				break;
			}
			let index = slots.len() as u32;
			let address = self.derive_address(chain, index)?;
			self.chain_slots_mut(chain).push(UsedAddress {
				index,
				address,
				used: false,
			});
		}
		Ok(())
	}

	pub fn unused_addresses(&self, chain: Chain) -> Vec<Address> {
		if let Some(addr) = self.single_address {
			return vec![addr];
		}
		self.chain_slots(chain).iter().filter(|s| !s.used).map(|s| s.address).collect()
	}

	pub fn all_addresses(&self, chain: Chain) -> Vec<Address> {
		if let Some(addr) = self.single_address {
			return vec![addr];
		}
		self.chain_slots(chain).iter().map(|s| s.address).collect()
	}

	/// Next fresh receive address, extending the discovery window.
	pub fn receive_address(&mut self) -> Result<Address> {
		if let Some(addr) = self.single_address {
			return Ok(addr);
		}
		self.fill_gap(Chain::External)?;
		let addr = self
			.external
			.iter()
			.find(|s| !s.used)
			.map(|s| s.address)
			.expect("fill_gap always leaves an unused slot");
		Ok(addr)
	}

	pub fn chain_index_of(&self, address: &Address) -> Option<(Chain, u32)> {
		for slot in &self.external {
			if &slot.address == address {
				return Some((Chain::External, slot.index));
			}
		}
		for slot in &self.internal {
			if &slot.address == address {
				return Some((Chain::Internal, slot.index));
			}
		}
		None
	}

	pub fn contains_address(&self, address: &Address) -> bool {
		self.single_address == Some(*address) || self.chain_index_of(address).is_some()
	}

	/// Mark an address used and widen the discovery window past it,
	/// mirroring `Account::AddUsedAddrs`.
	pub fn mark_used(&mut self, address: &Address) -> Result<()> {
		if let Some((chain, index)) = self.chain_index_of(address) {
			if let Some(slot) = self.chain_slots_mut(chain).iter_mut().find(|s| s.index == index) {
				slot.used = true;
			}
			self.fill_gap(chain)?;
		}
		Ok(())
	}

	/// How many of the `m` required signatures this wallet can still
	/// contribute given signatures already collected, and whether it owns a
	/// cosigning slot in this redeem script at all. Mirrors
	/// `SubAccount::GetSignedInfo` used for partially-signed multi-sign
	/// transaction reporting.
	pub fn signed_info(&self, signers_present: usize) -> (usize, bool) {
		let required = usize::from(self.m);
		(signers_present, signers_present >= required)
	}

	/// Deposit address for producer/CR-council registration, built from the
	/// account's dedicated owner-key branch, per `Wallet::GetOwnerDepositAddress`.
	pub fn owner_deposit_address(&self) -> Result<Address> {
		let own_chain = self
			.own_chain
			.as_ref()
			.ok_or_else(|| Error::InvalidArgument("read-only account has no owner key".into()))?;
		let pubkey = own_chain.owner_public_key()?;
		Ok(Address::from_pubkey(Prefix::Deposit, &pubkey.key.serialize()))
	}

	/// Deposit address for a CR-council member's sponsor registration, built
	/// from the account's dedicated DID-key branch, per
	/// `Wallet::GetCROwnerDepositAddress`.
	pub fn cr_owner_deposit_address(&self) -> Result<Address> {
		let own_chain = self
			.own_chain
			.as_ref()
			.ok_or_else(|| Error::InvalidArgument("read-only account has no DID key".into()))?;
		let pubkey = own_chain.did_public_key()?;
		Ok(Address::from_pubkey(Prefix::Deposit, &pubkey.key.serialize()))
	}

	pub fn own_index(&self) -> usize {
		let own_fp = match &self.own_chain {
			Some(c) => c.master_fingerprint(),
			None => return 0,
		};
		self.cosigners
			.iter()
			.position(|c| c.key_chain.master_fingerprint() == own_fp)
			.unwrap_or(0)
	}
}
