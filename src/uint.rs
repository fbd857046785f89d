//! Fixed-width big-endian-displayed unsigned integers.
//!
//! These are value types used as hashes (`U256`), program hashes (`U160`),
//! and packed address bytes (`U168`, `U512` for multi-sig redeem data). They
//! are bytewise-comparable, have a well-defined zero, and support both a
//! raw-bytes view and a big-endian hex text view. `U256` additionally
//! supports byte-reversal, since hashes are stored internally big-endian but
//! conventionally displayed reversed (little-endian) on block explorers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use error::{Error, Result};

macro_rules! fixed_uint {
    ($name:ident, $bytes:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; $bytes]);

        impl $name {
            pub const LEN: usize = $bytes;
            pub const ZERO: $name = $name([0u8; $bytes]);

            /// Build from a raw big-endian byte array.
            pub fn from_bytes(bytes: &[u8]) -> Result<$name> {
                if bytes.len() != $bytes {
                    return Err(Error::InvalidArgument(format!(
                        "{} expects {} bytes, got {}",
                        stringify!($name),
                        $bytes,
                        bytes.len()
                    )));
                }
                let mut out = [0u8; $bytes];
                out.copy_from_slice(bytes);
                Ok($name(out))
            }

            pub fn as_bytes(&self) -> &[u8; $bytes] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Big-endian hex string, as displayed by the reference node.
            pub fn to_hex(&self) -> String {
                ::hex::encode(&self.0[..])
            }

            pub fn from_hex(s: &str) -> Result<$name> {
                let bytes = ::hex::decode(s)
                    .map_err(|e| Error::InvalidArgument(format!("bad hex: {}", e)))?;
                $name::from_bytes(&bytes)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::ZERO
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<$name> {
                $name::from_hex(s)
            }
        }
    };
}

fixed_uint!(U128, 16);
fixed_uint!(U160, 20);
fixed_uint!(U168, 21);
fixed_uint!(U256, 32);
fixed_uint!(U512, 64);

impl U256 {
    /// Byte-reversed copy. Hashes are kept internally in the order they are
    /// hashed (big-endian-by-convention), but commonly displayed reversed.
    pub fn reversed(&self) -> U256 {
        let mut out = self.0;
        out.reverse();
        U256(out)
    }

    /// Little-endian 32-bit integer groups, as the wire/original-C++ layout
    /// treats a 256-bit hash as eight `u32` words for fast equality/compare.
    pub fn as_u32_groups_le(&self) -> [u32; 8] {
        let mut groups = [0u32; 8];
        for (i, chunk) in self.0.chunks(4).enumerate() {
            groups[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_well_defined() {
        assert!(U256::ZERO.is_zero());
        assert_eq!(U256::ZERO, U256([0u8; 32]));
    }

    #[test]
    fn hex_round_trip() {
        let bytes: Vec<u8> = (0u8..32).collect();
        let u = U256::from_bytes(&bytes).unwrap();
        let hex = u.to_hex();
        let back = U256::from_hex(&hex).unwrap();
        assert_eq!(u, back);
    }

    #[test]
    fn reverse_is_involutive() {
        let bytes: Vec<u8> = (0u8..32).collect();
        let u = U256::from_bytes(&bytes).unwrap();
        assert_eq!(u.reversed().reversed(), u);
        assert_ne!(u.reversed(), u);
    }

    #[test]
    fn bytewise_ordering() {
        let a = U160::from_bytes(&[0u8; 20]).unwrap();
        let mut hi = [0u8; 20];
        hi[0] = 1;
        let b = U160::from_bytes(&hi).unwrap();
        assert!(a < b);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(U256::from_bytes(&[0u8; 31]).is_err());
    }
}
