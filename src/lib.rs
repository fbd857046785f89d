// ELA SPV Wallet
// Written in 2019 by
//   Steven Roose <steven@stevenroose.org>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! # ELA SPV Wallet
//!
//! An in-memory SPV wallet engine for a UTXO-based chain with auxiliary
//! side chains. See [`wallet::Wallet`] for the core state machine.

#![crate_name = "ela_spv_wallet"]
#![crate_type = "dylib"]
#![crate_type = "rlib"]

// Coding conventions
#![forbid(unsafe_code)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

extern crate bitcoin;
extern crate bitcoin_hashes;
extern crate bs58;
extern crate byteorder;
extern crate hex;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate num_bigint;
extern crate num_traits;
extern crate secp256k1;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

pub mod address;
pub mod bigint;
pub mod bytestream;
pub mod config;
pub mod element_set;
pub mod envelope;
pub mod error;
pub mod grouped_asset;
pub mod hdkeychain;
pub mod listener;
pub mod peer;
pub mod storage;
pub mod subaccount;
pub mod transaction;
pub mod uint;
pub mod utxo;
pub mod wallet;

lazy_static! {
    static ref SECP: secp256k1::Secp256k1<secp256k1::All> = secp256k1::Secp256k1::new();
}

/// Block height value meaning "not yet confirmed".
pub const TX_UNCONFIRMED: u32 = 0x7FFF_FFFF;

/// Default fee rate, expressed in sats-equivalents per kilobyte.
pub const DEFAULT_FEE_PER_KB: u64 = 10_000;

/// Gap limit kept ahead of the highest used index on the external chain.
pub const SEQUENCE_GAP_LIMIT_EXTERNAL: u32 = 10;

/// Gap limit kept ahead of the highest used index on the internal (change) chain.
pub const SEQUENCE_GAP_LIMIT_INTERNAL: u32 = 5;

/// Number of confirmations before a coinbase output becomes spendable.
pub const COINBASE_MATURITY: u32 = 100;

/// Maximum number of cosigners in a multi-signature account.
pub const MAX_MULTISIG_COSIGNERS: usize = 6;
