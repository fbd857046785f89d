//! Arbitrary-precision signed integer used for token amounts whose
//! precision exceeds 64 bits (spec.md §3). Wraps `num_bigint::BigInt`, the
//! same crate `tsengcoin-core` already depends on for big-integer
//! arithmetic, behind a newtype with the decimal/hex text codecs the
//! reference node's `BigInt::getDec`/`setDec` (seen throughout
//! `original_source/`, e.g. `CoinBaseUTXODataStore.cpp`'s
//! `entity->Output()->Amount().getDec()`) expose.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt as NumBigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(NumBigInt);

// NumBigInt implements PartialOrd/Ord itself; the derive above threads
// through to it via the single-field newtype.

impl BigInt {
	pub fn zero() -> BigInt {
		BigInt(NumBigInt::zero())
	}

	pub fn from_u64(v: u64) -> BigInt {
		BigInt(NumBigInt::from(v))
	}

	pub fn from_i64(v: i64) -> BigInt {
		BigInt(NumBigInt::from(v))
	}

	pub fn from_dec_str(s: &str) -> Result<BigInt> {
		NumBigInt::from_str(s)
			.map(BigInt)
			.map_err(|e| Error::InvalidArgument(format!("bad decimal amount {:?}: {}", s, e)))
	}

	pub fn from_hex_str(s: &str) -> Result<BigInt> {
		let s = s.trim_start_matches("0x").trim_start_matches("0X");
		NumBigInt::parse_bytes(s.as_bytes(), 16)
			.map(BigInt)
			.ok_or_else(|| Error::InvalidArgument(format!("bad hex amount {:?}", s)))
	}

	pub fn to_dec_string(&self) -> String {
		self.0.to_str_radix(10)
	}

	pub fn to_hex_string(&self) -> String {
		let (sign, bytes) = self.0.to_bytes_be();
		let hex = hex::encode(bytes);
		match sign {
			Sign::Minus => format!("-{}", hex),
			_ => hex,
		}
	}

	pub fn is_zero(&self) -> bool {
		self.0.is_zero()
	}

	pub fn is_negative(&self) -> bool {
		self.0.sign() == Sign::Minus
	}

	pub fn to_u64(&self) -> Option<u64> {
		self.0.to_u64()
	}

	/// `ceil(self / divisor)`, used by the fee-per-kb rounding in
	/// `GroupedAsset::create_tx_for_outputs` (spec.md §4.5 step 6).
	pub fn ceil_div_u64(&self, divisor: u64) -> BigInt {
		if divisor == 0 {
			return BigInt::zero();
		}
		let divisor = NumBigInt::from(divisor);
		let (q, r) = (&self.0 / &divisor, &self.0 % &divisor);
		if r.is_zero() {
			BigInt(q)
		} else {
			BigInt(q + NumBigInt::from(1))
		}
	}
}

impl Default for BigInt {
	fn default() -> Self {
		BigInt::zero()
	}
}

impl fmt::Display for BigInt {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.to_dec_string())
	}
}

impl FromStr for BigInt {
	type Err = Error;

	fn from_str(s: &str) -> Result<BigInt> {
		BigInt::from_dec_str(s)
	}
}

impl PartialEq<i64> for BigInt {
	fn eq(&self, other: &i64) -> bool {
		self.0 == NumBigInt::from(*other)
	}
}

impl PartialOrd<i64> for BigInt {
	fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
		self.0.partial_cmp(&NumBigInt::from(*other))
	}
}

impl Add for BigInt {
	type Output = BigInt;

	fn add(self, rhs: BigInt) -> BigInt {
		BigInt(self.0 + rhs.0)
	}
}

impl<'a> Add<&'a BigInt> for BigInt {
	type Output = BigInt;

	fn add(self, rhs: &'a BigInt) -> BigInt {
		BigInt(self.0 + &rhs.0)
	}
}

impl Sub for BigInt {
	type Output = BigInt;

	fn sub(self, rhs: BigInt) -> BigInt {
		BigInt(self.0 - rhs.0)
	}
}

impl Mul for BigInt {
	type Output = BigInt;

	fn mul(self, rhs: BigInt) -> BigInt {
		BigInt(self.0 * rhs.0)
	}
}

impl Neg for BigInt {
	type Output = BigInt;

	fn neg(self) -> BigInt {
		BigInt(-self.0)
	}
}

impl Sum for BigInt {
	fn sum<I: Iterator<Item = BigInt>>(iter: I) -> BigInt {
		iter.fold(BigInt::zero(), |a, b| a + b)
	}
}

impl<'a> Sum<&'a BigInt> for BigInt {
	fn sum<I: Iterator<Item = &'a BigInt>>(iter: I) -> BigInt {
		iter.fold(BigInt::zero(), |a, b| a + b.clone())
	}
}

impl Serialize for BigInt {
	fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_dec_string())
	}
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
	type Value = BigInt;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("a decimal-string-encoded big integer")
	}

	fn visit_str<E: de::Error>(self, v: &str) -> ::std::result::Result<BigInt, E> {
		BigInt::from_dec_str(v).map_err(de::Error::custom)
	}
}

impl<'de> Deserialize<'de> for BigInt {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<BigInt, D::Error> {
		deserializer.deserialize_str(BigIntVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decimal_round_trip() {
		let a = BigInt::from_dec_str("123456789012345678901234567890").unwrap();
		assert_eq!(a.to_dec_string(), "123456789012345678901234567890");
	}

	#[test]
	fn ceil_div_rounds_up() {
		let a = BigInt::from_u64(2500);
		assert_eq!(a.ceil_div_u64(1000).to_dec_string(), "3");
		let b = BigInt::from_u64(2000);
		assert_eq!(b.ceil_div_u64(1000).to_dec_string(), "2");
	}

	#[test]
	fn arithmetic() {
		let a = BigInt::from_u64(10);
		let b = BigInt::from_u64(3);
		assert_eq!((a.clone() - b.clone()).to_dec_string(), "7");
		assert_eq!((a + b).to_dec_string(), "13");
	}

	#[test]
	fn negative_amounts_are_detected() {
		let a = BigInt::from_i64(-5);
		assert!(a.is_negative());
		assert!(a < 0i64);
	}
}
