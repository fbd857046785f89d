//! Hash-keyed ordered set, grounded in
//! `original_source/SDK/Common/ElementSet.h`. The reference node backs this
//! with `std::set<T, TCompare>` ordered by `T::GetHash()`; a `BTreeMap<U256,
//! T>` gives the same deterministic-order, O(log n) lookup/insert/remove
//! behaviour without needing a custom comparator trait.

use std::collections::BTreeMap;

use uint::U256;

pub trait Hashable {
	fn element_hash(&self) -> U256;
}

#[derive(Clone, Debug, Default)]
pub struct ElementSet<T: Hashable> {
	inner: BTreeMap<U256, T>,
}

impl<T: Hashable> ElementSet<T> {
	pub fn new() -> ElementSet<T> {
		ElementSet {
			inner: BTreeMap::new(),
		}
	}

	pub fn get(&self, hash: &U256) -> Option<&T> {
		self.inner.get(hash)
	}

	pub fn get_mut(&mut self, hash: &U256) -> Option<&mut T> {
		self.inner.get_mut(hash)
	}

	pub fn contains_hash(&self, hash: &U256) -> bool {
		self.inner.contains_key(hash)
	}

	pub fn contains(&self, e: &T) -> bool {
		self.contains_hash(&e.element_hash())
	}

	/// Returns the previous element with the same hash, if any.
	pub fn insert(&mut self, e: T) -> Option<T> {
		self.inner.insert(e.element_hash(), e)
	}

	pub fn remove(&mut self, e: &T) -> Option<T> {
		self.inner.remove(&e.element_hash())
	}

	pub fn remove_hash(&mut self, hash: &U256) -> Option<T> {
		self.inner.remove(hash)
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn clear(&mut self) {
		self.inner.clear()
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.inner.values()
	}

	pub fn raw(&self) -> Vec<&T> {
		self.inner.values().collect()
	}
}

/// Elements keyed by the hash of the previous output they spend (UTXOs),
/// supporting the `GetMatchPrevHash`/`RemoveMatchPrevHash` lookups the
/// reference node uses to find a spent UTXO by its outpoint's tx hash.
pub trait PrevHashIndexed: Hashable {
	fn prev_hash(&self) -> U256;
}

impl<T: PrevHashIndexed> ElementSet<T> {
	pub fn get_match_prev_hash(&self, prev_hash: &U256) -> Vec<&T> {
		self.inner.values().filter(|e| &e.prev_hash() == prev_hash).collect()
	}

	pub fn remove_match_prev_hash(&mut self, prev_hash: &U256) -> Vec<T> {
		let hashes: Vec<U256> = self
			.inner
			.iter()
			.filter(|(_, e)| &e.prev_hash() == prev_hash)
			.map(|(h, _)| *h)
			.collect();
		hashes.into_iter().filter_map(|h| self.inner.remove(&h)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	struct Item {
		hash: U256,
		prev: U256,
	}

	impl Hashable for Item {
		fn element_hash(&self) -> U256 {
			self.hash
		}
	}

	impl PrevHashIndexed for Item {
		fn prev_hash(&self) -> U256 {
			self.prev
		}
	}

	fn u256(b: u8) -> U256 {
		U256::from_bytes(&[b; 32]).unwrap()
	}

	#[test]
	fn insert_get_remove_round_trip() {
		let mut set = ElementSet::new();
		let item = Item { hash: u256(1), prev: u256(9) };
		assert!(set.insert(item.clone()).is_none());
		assert!(set.contains(&item));
		assert_eq!(set.get(&u256(1)), Some(&item));
		assert_eq!(set.remove(&item), Some(item.clone()));
		assert!(!set.contains(&item));
	}

	#[test]
	fn insert_replaces_same_hash() {
		let mut set = ElementSet::new();
		set.insert(Item { hash: u256(1), prev: u256(1) });
		let prev = set.insert(Item { hash: u256(1), prev: u256(2) });
		assert!(prev.is_some());
		assert_eq!(set.len(), 1);
		assert_eq!(set.get(&u256(1)).unwrap().prev, u256(2));
	}

	#[test]
	fn match_prev_hash_finds_all_spenders() {
		let mut set = ElementSet::new();
		set.insert(Item { hash: u256(1), prev: u256(9) });
		set.insert(Item { hash: u256(2), prev: u256(9) });
		set.insert(Item { hash: u256(3), prev: u256(8) });
		assert_eq!(set.get_match_prev_hash(&u256(9)).len(), 2);
		let removed = set.remove_match_prev_hash(&u256(9));
		assert_eq!(removed.len(), 2);
		assert_eq!(set.len(), 1);
	}
}
