//! Deterministic little-endian wire codec (spec.md §3.2), grounded in
//! `original_source/SDK/Common/ByteStream.cpp`. `Writer` never fails;
//! `Reader` is bounds-checked and returns `None` on underrun without
//! leaving partial state for the caller to worry about.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Infallible little-endian writer.
#[derive(Clone, Debug, Default)]
pub struct Writer {
	buf: Vec<u8>,
}

impl Writer {
	pub fn new() -> Writer {
		Writer { buf: Vec::new() }
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	pub fn write_u8(&mut self, v: u8) -> &mut Self {
		self.buf.push(v);
		self
	}

	pub fn write_u16(&mut self, v: u16) -> &mut Self {
		self.buf.write_u16::<LittleEndian>(v).unwrap();
		self
	}

	pub fn write_u32(&mut self, v: u32) -> &mut Self {
		self.buf.write_u32::<LittleEndian>(v).unwrap();
		self
	}

	pub fn write_u64(&mut self, v: u64) -> &mut Self {
		self.buf.write_u64::<LittleEndian>(v).unwrap();
		self
	}

	pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Big-endian network order, as hashes/program-hashes are carried on the
	/// wire (spec.md §3.3).
	pub fn write_hash(&mut self, bytes: &[u8]) -> &mut Self {
		let mut reversed = bytes.to_vec();
		reversed.reverse();
		self.write_bytes(&reversed)
	}

	/// Bitcoin-style compact size: 1 byte for <0xFD, else a marker byte
	/// followed by 2/4/8 bytes.
	pub fn write_var_uint(&mut self, v: u64) -> &mut Self {
		if v < 0xFD {
			self.write_u8(v as u8);
		} else if v <= 0xFFFF {
			self.write_u8(0xFD);
			self.write_u16(v as u16);
		} else if v <= 0xFFFF_FFFF {
			self.write_u8(0xFE);
			self.write_u32(v as u32);
		} else {
			self.write_u8(0xFF);
			self.write_u64(v);
		}
		self
	}

	pub fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.write_var_uint(bytes.len() as u64);
		self.write_bytes(bytes);
		self
	}
}

/// Bounds-checked little-endian reader. Every method returns `None` on
/// underrun, leaving the cursor at its pre-call position.
pub struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	pub fn new(buf: &'a [u8]) -> Reader<'a> {
		Reader { buf, pos: 0 }
	}

	pub fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	fn take(&mut self, n: usize) -> Option<&'a [u8]> {
		if self.remaining() < n {
			return None;
		}
		let slice = &self.buf[self.pos..self.pos + n];
		self.pos += n;
		Some(slice)
	}

	pub fn read_u8(&mut self) -> Option<u8> {
		self.take(1).map(|s| s[0])
	}

	pub fn read_u16(&mut self) -> Option<u16> {
		self.take(2).map(|mut s| s.read_u16::<LittleEndian>().unwrap())
	}

	pub fn read_u32(&mut self) -> Option<u32> {
		self.take(4).map(|mut s| s.read_u32::<LittleEndian>().unwrap())
	}

	pub fn read_u64(&mut self) -> Option<u64> {
		self.take(8).map(|mut s| s.read_u64::<LittleEndian>().unwrap())
	}

	pub fn read_bytes(&mut self, n: usize) -> Option<Vec<u8>> {
		self.take(n).map(|s| s.to_vec())
	}

	pub fn read_hash(&mut self, n: usize) -> Option<Vec<u8>> {
		self.read_bytes(n).map(|mut v| {
			v.reverse();
			v
		})
	}

	pub fn read_var_uint(&mut self) -> Option<u64> {
		let marker = self.read_u8()?;
		match marker {
			0xFD => self.read_u16().map(u64::from),
			0xFE => self.read_u32().map(u64::from),
			0xFF => self.read_u64(),
			_ => Some(u64::from(marker)),
		}
	}

	pub fn read_var_bytes(&mut self) -> Option<Vec<u8>> {
		let len = self.read_var_uint()?;
		self.read_bytes(len as usize)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn var_uint_boundaries_round_trip() {
		for v in [0u64, 1, 0xFC, 0xFD, 0xFFFF, 0x1_0000, 0xFFFF_FFFF, 0x1_0000_0000] {
			let mut w = Writer::new();
			w.write_var_uint(v);
			let bytes = w.into_bytes();
			let mut r = Reader::new(&bytes);
			assert_eq!(r.read_var_uint(), Some(v), "failed for {}", v);
			assert!(r.is_empty());
		}
	}

	#[test]
	fn var_bytes_round_trip() {
		let payload = vec![1u8, 2, 3, 4, 5];
		let mut w = Writer::new();
		w.write_var_bytes(&payload);
		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		assert_eq!(r.read_var_bytes(), Some(payload));
	}

	#[test]
	fn reader_reports_underrun_without_panicking() {
		let bytes = vec![0x01];
		let mut r = Reader::new(&bytes);
		assert_eq!(r.read_u32(), None);
		assert_eq!(r.remaining(), 1);
	}

	#[test]
	fn hash_round_trip_reverses_byte_order() {
		let hash: Vec<u8> = (0u8..32).collect();
		let mut w = Writer::new();
		w.write_hash(&hash);
		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		let back = r.read_hash(32).unwrap();
		assert_eq!(back, hash);
	}
}
