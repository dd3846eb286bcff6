//! Persistent hash-array-mapped trie (spec §3.4, component C).
//!
//! 5-bit branching (32-way), keyed by the *canonical print form* of the
//! value (spec §3.4, §4.7 "also used by... map-key hashing"): two values
//! are the same key iff `inspect(a) == inspect(b)`. Hashing the printed
//! form with `fxhash`, rather than hand-rolling a hasher, keeps this in
//! step with the `FxHashMap` used for every other lookup table in this
//! crate.

use std::rc::Rc;

use crate::inspect::inspect_canonical;
use crate::value::Value;

const BITS: u32 = 5;
const MASK: u64 = (1 << BITS) - 1;
const MAX_DEPTH: u32 = 64 / BITS + 1;

#[derive(Debug, Clone)]
struct Entry {
	hash: u64,
	key_print: Rc<str>,
	key: Value,
	value: Value,
}

#[derive(Debug, Clone)]
enum Node {
	/// An interior node: `bitmap` marks which of the 32 slots hold a
	/// direct entry, `child_bitmap` marks which hold a child subtree — a
	/// slot index is never set in both. `entries`/`children` are
	/// compressed: only as long as their popcount, ordered by slot index.
	Branch { bitmap: u32, child_bitmap: u32, entries: Rc<[Entry]>, children: Rc<[Rc<Node>]> },
	/// Entries whose hashes still collide after exhausting all 5-bit
	/// chunks of the hash (spec §3.4: "at which point entries are kept
	/// in a flat linear list").
	Collision { hash: u64, entries: Rc<[Entry]> },
}

impl Node {
	fn empty() -> Node {
		Node::Branch { bitmap: 0, child_bitmap: 0, entries: Rc::from(Vec::new()), children: Rc::from(Vec::new()) }
	}
}

fn chunk(hash: u64, depth: u32) -> u32 {
	((hash >> (depth * BITS)) & MASK) as u32
}

fn popcount_below(bitmap: u32, slot: u32) -> usize {
	(bitmap & ((1u32 << slot) - 1)).count_ones() as usize
}

/// Returns `(new_node, was_insert)`; `was_insert` is `false` when an
/// existing key's value was replaced (so `len` does not change).
fn insert(node: &Node, depth: u32, entry: Entry) -> (Node, bool) {
	match node {
		Node::Collision { hash, entries } => {
			if *hash != entry.hash || depth < MAX_DEPTH {
				// Hashes diverge again (or we still have bits left, meaning
				// this collision node was built deeper than necessary after
				// prior removals) — wrap both in a fresh branch one level down.
				let mut branch = Node::empty();
				let mut inserted = false;
				for e in entries.iter() {
					let (next, _) = insert(&branch, depth, e.clone());
					branch = next;
				}
				let (next, was_insert) = insert(&branch, depth, entry);
				inserted = was_insert;
				(next, inserted)
			} else {
				let mut entries = entries.to_vec();
				if let Some(slot) = entries.iter().position(|e| e.key_print == entry.key_print) {
					entries[slot] = entry;
					(Node::Collision { hash: *hash, entries: Rc::from(entries) }, false)
				} else {
					entries.push(entry);
					(Node::Collision { hash: *hash, entries: Rc::from(entries) }, true)
				}
			}
		}
		Node::Branch { bitmap, child_bitmap, entries, children } => {
			let slot = chunk(entry.hash, depth);
			let bit = 1u32 << slot;

			if bitmap & bit != 0 {
				let pos = popcount_below(*bitmap, slot);
				let existing = &entries[pos];
				if existing.key_print == entry.key_print {
					let mut entries = entries.to_vec();
					entries[pos] = entry;
					return (Node::Branch { bitmap: *bitmap, child_bitmap: *child_bitmap, entries: Rc::from(entries), children: children.clone() }, false);
				}
				// Collision at this slot: push both entries one level deeper.
				let sub = if depth + 1 >= MAX_DEPTH {
					Node::Collision { hash: existing.hash, entries: Rc::from(vec![existing.clone()]) }
				} else {
					Node::empty()
				};
				let (sub, _) = insert(&sub, depth + 1, existing.clone());
				let (sub, was_insert) = insert(&sub, depth + 1, entry);
				debug_assert!(was_insert);

				let mut entries = entries.to_vec();
				entries.remove(pos);
				let mut children = children.to_vec();
				let child_pos = popcount_below(*child_bitmap, slot);
				children.insert(child_pos, Rc::new(sub));

				(Node::Branch { bitmap: bitmap & !bit, child_bitmap: child_bitmap | bit, entries: Rc::from(entries), children: Rc::from(children) }, true)
			} else if child_bitmap & bit != 0 {
				let pos = popcount_below(*child_bitmap, slot);
				let (new_child, was_insert) = insert(&children[pos], depth + 1, entry);
				let mut children = children.to_vec();
				children[pos] = Rc::new(new_child);
				(Node::Branch { bitmap: *bitmap, child_bitmap: *child_bitmap, entries: Rc::from(entries.to_vec()), children: Rc::from(children) }, was_insert)
			} else {
				let pos = popcount_below(*bitmap, slot);
				let mut entries = entries.to_vec();
				entries.insert(pos, entry);
				(Node::Branch { bitmap: bitmap | bit, child_bitmap: *child_bitmap, entries: Rc::from(entries), children: children.clone() }, true)
			}
		}
	}
}

fn get<'n>(node: &'n Node, depth: u32, hash: u64, key_print: &str) -> Option<&'n Value> {
	match node {
		Node::Collision { entries, .. } => entries.iter().find(|e| e.key_print.as_ref() == key_print).map(|e| &e.value),
		Node::Branch { bitmap, child_bitmap, entries, children } => {
			let slot = chunk(hash, depth);
			let bit = 1u32 << slot;
			if bitmap & bit != 0 {
				let pos = popcount_below(*bitmap, slot);
				let entry = &entries[pos];
				(entry.key_print.as_ref() == key_print).then_some(&entry.value)
			} else if child_bitmap & bit != 0 {
				let pos = popcount_below(*child_bitmap, slot);
				get(&children[pos], depth + 1, hash, key_print)
			} else {
				None
			}
		}
	}
}

fn remove(node: &Node, depth: u32, hash: u64, key_print: &str) -> (Node, bool) {
	match node {
		Node::Collision { hash: h, entries } => {
			let mut entries = entries.to_vec();
			let before = entries.len();
			entries.retain(|e| e.key_print.as_ref() != key_print);
			let removed = entries.len() != before;
			(Node::Collision { hash: *h, entries: Rc::from(entries) }, removed)
		}
		Node::Branch { bitmap, child_bitmap, entries, children } => {
			let slot = chunk(hash, depth);
			let bit = 1u32 << slot;
			if bitmap & bit != 0 {
				let pos = popcount_below(*bitmap, slot);
				if entries[pos].key_print.as_ref() != key_print {
					return (node.clone(), false);
				}
				let mut entries = entries.to_vec();
				entries.remove(pos);
				(Node::Branch { bitmap: bitmap & !bit, child_bitmap: *child_bitmap, entries: Rc::from(entries), children: children.clone() }, true)
			} else if child_bitmap & bit != 0 {
				let pos = popcount_below(*child_bitmap, slot);
				let (new_child, removed) = remove(&children[pos], depth + 1, hash, key_print);
				if !removed {
					return (node.clone(), false);
				}
				let mut children = children.to_vec();
				match &new_child {
					Node::Branch { bitmap: b, child_bitmap: cb, .. } if *b == 0 && *cb == 0 => {
						children.remove(pos);
						(Node::Branch { bitmap: *bitmap, child_bitmap: child_bitmap & !bit, entries: entries.clone(), children: Rc::from(children) }, true)
					}
					_ => {
						children[pos] = Rc::new(new_child);
						(Node::Branch { bitmap: *bitmap, child_bitmap: *child_bitmap, entries: entries.clone(), children: Rc::from(children) }, true)
					}
				}
			} else {
				(node.clone(), false)
			}
		}
	}
}

fn for_each<'n>(node: &'n Node, f: &mut impl FnMut(&'n Value, &'n Value)) {
	match node {
		Node::Collision { entries, .. } => {
			for e in entries.iter() {
				f(&e.key, &e.value);
			}
		}
		Node::Branch { entries, children, .. } => {
			for e in entries.iter() {
				f(&e.key, &e.value);
			}
			for c in children.iter() {
				for_each(c, f);
			}
		}
	}
}

/// A persistent map from value to value (spec §3.1 `Map`, §3.4).
#[derive(Debug, Clone)]
pub struct PersistentMap {
	root: Rc<Node>,
	len: usize,
}

impl PersistentMap {
	pub fn new() -> Self {
		PersistentMap { root: Rc::new(Node::empty()), len: 0 }
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn hash_of(key: &Value) -> (u64, Rc<str>) {
		let print = inspect_canonical(key);
		(fxhash::hash(&print), Rc::from(print))
	}

	pub fn get(&self, key: &Value) -> Option<&Value> {
		let (hash, print) = Self::hash_of(key);
		get(&self.root, 0, hash, &print)
	}

	pub fn contains_key(&self, key: &Value) -> bool {
		self.get(key).is_some()
	}

	pub fn put(&self, key: Value, value: Value) -> Self {
		let (hash, key_print) = Self::hash_of(&key);
		let (new_root, was_insert) = insert(&self.root, 0, Entry { hash, key_print, key, value });
		PersistentMap { root: Rc::new(new_root), len: if was_insert { self.len + 1 } else { self.len } }
	}

	pub fn remove(&self, key: &Value) -> Self {
		let (hash, print) = Self::hash_of(key);
		let (new_root, removed) = remove(&self.root, 0, hash, &print);
		PersistentMap { root: Rc::new(new_root), len: if removed { self.len - 1 } else { self.len } }
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
		let mut out = Vec::with_capacity(self.len);
		for_each(&self.root, &mut |k, v| out.push((k, v)));
		out.into_iter()
	}

	pub fn from_iter(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
		let mut map = PersistentMap::new();
		for (k, v) in pairs {
			map = map.put(k, v);
		}
		map
	}
}

impl Default for PersistentMap {
	fn default() -> Self {
		PersistentMap::new()
	}
}

impl PartialEq for PersistentMap {
	fn eq(&self, other: &Self) -> bool {
		if self.len != other.len {
			return false;
		}
		self.iter().all(|(k, v)| other.get(k) == Some(v))
	}
}
impl Eq for PersistentMap {}

#[cfg(test)]
mod tests {
	use super::*;

	fn s(v: &str) -> Value {
		Value::from_str_literal(v)
	}

	#[test]
	fn put_get_remove_round_trip() {
		let map = PersistentMap::new();
		let map = map.put(s("a"), Value::Integer(1));
		let map = map.put(s("b"), Value::Integer(2));
		assert_eq!(map.get(&s("a")), Some(&Value::Integer(1)));
		assert_eq!(map.len(), 2);

		let removed = map.remove(&s("a"));
		assert_eq!(removed.get(&s("a")), None);
		assert_eq!(removed.len(), 1);
		assert_eq!(map.get(&s("a")), Some(&Value::Integer(1)), "remove must not mutate the original map");
	}

	#[test]
	fn put_same_key_replaces_without_growing_len() {
		let map = PersistentMap::new().put(s("a"), Value::Integer(1));
		let map = map.put(s("a"), Value::Integer(2));
		assert_eq!(map.len(), 1);
		assert_eq!(map.get(&s("a")), Some(&Value::Integer(2)));
	}

	#[test]
	fn many_keys_survive_collisions_and_growth() {
		let mut map = PersistentMap::new();
		for i in 0..5000i64 {
			map = map.put(Value::Integer(i), Value::Integer(i * 2));
		}
		assert_eq!(map.len(), 5000);
		for i in [0i64, 1, 100, 4999] {
			assert_eq!(map.get(&Value::Integer(i)), Some(&Value::Integer(i * 2)));
		}
	}

	#[test]
	fn keys_equal_by_canonical_print_form() {
		// Two distinct Rc<str> allocations with the same text must hash
		// and compare as the same map key (spec §3.4).
		let map = PersistentMap::new().put(Value::from_str_literal("hi"), Value::Integer(1));
		assert_eq!(map.get(&Value::from_str_literal("hi".to_string().as_str())), Some(&Value::Integer(1)));
	}
}
