//! Byte-keyed ordered prefix map.
//!
//! `Trie<V>` stores values under byte-string keys with O(|key|) exact lookup,
//! in-place mutation and a stable serialized form. The history learner keeps
//! its unigram/bigram counters in two of these; the serialized blobs embed
//! directly into larger streams because the encoding is self-delimiting.
//!
//! Single-writer: mutation is not synchronized against concurrent readers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::errors::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node<V> {
    value: Option<V>,
    /// Children sorted by label byte; the index points into the arena.
    children: Vec<(u8, u32)>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Node {
            value: None,
            children: Vec::new(),
        }
    }

    fn child(&self, label: u8) -> Option<u32> {
        self.children
            .binary_search_by_key(&label, |c| c.0)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Ordered map from byte strings to values, node 0 being the root.
///
/// # Example
/// ```
/// use shuru_core::trie::Trie;
///
/// let mut trie: Trie<i32> = Trie::new();
/// trie.update(b"ni", |v| v + 1);
/// trie.update(b"ni", |v| v + 1);
/// assert_eq!(trie.exact_match_search(b"ni"), Some(2));
/// assert_eq!(trie.exact_match_search(b"n"), None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trie<V> {
    nodes: Vec<Node<V>>,
    len: usize,
}

impl<V: Copy> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy> Trie<V> {
    pub fn new() -> Self {
        Trie {
            nodes: vec![Node::new()],
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every stored key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new());
        self.len = 0;
    }

    fn walk(&self, key: &[u8]) -> Option<usize> {
        let mut idx = 0usize;
        for &b in key {
            idx = self.nodes[idx].child(b)? as usize;
        }
        Some(idx)
    }

    fn walk_or_insert(&mut self, key: &[u8]) -> usize {
        let mut idx = 0usize;
        for &b in key {
            idx = match self.nodes[idx].child(b) {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len() as u32;
                    self.nodes.push(Node::new());
                    let pos = self.nodes[idx]
                        .children
                        .binary_search_by_key(&b, |c| c.0)
                        .unwrap_err();
                    self.nodes[idx].children.insert(pos, (b, child));
                    child as usize
                }
            };
        }
        idx
    }

    /// Exact lookup in O(|key|).
    pub fn exact_match_search(&self, key: &[u8]) -> Option<V> {
        self.walk(key).and_then(|idx| self.nodes[idx].value)
    }

    /// Insert or overwrite the value stored under `key`.
    pub fn set(&mut self, key: &[u8], value: V) {
        let idx = self.walk_or_insert(key);
        if self.nodes[idx].value.is_none() {
            self.len += 1;
        }
        self.nodes[idx].value = Some(value);
    }

    /// Remove `key`. Returns whether a value was stored.
    ///
    /// Nodes stay in the arena; only the value slot is vacated. The counter
    /// workload re-creates erased keys often enough that structural
    /// compaction is left to `clear`.
    pub fn erase(&mut self, key: &[u8]) -> bool {
        if let Some(idx) = self.walk(key) {
            if self.nodes[idx].value.take().is_some() {
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// Visit every stored key that is a prefix of `key`, shortest first.
    pub fn prefix_search<F: FnMut(&[u8], V)>(&self, key: &[u8], mut visitor: F) {
        let mut idx = 0usize;
        if let Some(v) = self.nodes[idx].value {
            visitor(&key[..0], v);
        }
        for (depth, &b) in key.iter().enumerate() {
            match self.nodes[idx].child(b) {
                Some(child) => {
                    idx = child as usize;
                    if let Some(v) = self.nodes[idx].value {
                        visitor(&key[..depth + 1], v);
                    }
                }
                None => break,
            }
        }
    }
}

impl<V: Copy + Default> Trie<V> {
    /// Apply `f` to the value under `key`, treating an absent key as
    /// `V::default()` (zero, for the counter case).
    pub fn update<F: FnOnce(V) -> V>(&mut self, key: &[u8], f: F) {
        let idx = self.walk_or_insert(key);
        if self.nodes[idx].value.is_none() {
            self.len += 1;
        }
        let current = self.nodes[idx].value.unwrap_or_default();
        self.nodes[idx].value = Some(f(current));
    }
}

impl<V: Copy + Serialize> Trie<V> {
    /// Write the trie to `writer` as a self-delimiting binary blob.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        bincode::serialize_into(writer, self).map_err(crate::errors::from_bincode)
    }
}

impl<V: Copy + DeserializeOwned> Trie<V> {
    /// Replace the contents with a blob previously written by [`Trie::save`].
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        *self = bincode::deserialize_from(reader).map_err(crate::errors::from_bincode)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn set_and_exact_match() {
        let mut trie: Trie<i32> = Trie::new();
        trie.set(b"ni", 3);
        trie.set(b"nihao", 7);
        assert_eq!(trie.exact_match_search(b"ni"), Some(3));
        assert_eq!(trie.exact_match_search(b"nihao"), Some(7));
        assert_eq!(trie.exact_match_search(b"n"), None);
        assert_eq!(trie.exact_match_search(b"hao"), None);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn update_defaults_to_zero() {
        let mut trie: Trie<i32> = Trie::new();
        trie.update(b"a|b", |v| v + 1);
        trie.update(b"a|b", |v| v + 1);
        assert_eq!(trie.exact_match_search(b"a|b"), Some(2));
    }

    #[test]
    fn erase_removes_only_the_key() {
        let mut trie: Trie<i32> = Trie::new();
        trie.set(b"ni", 1);
        trie.set(b"nihao", 2);
        assert!(trie.erase(b"ni"));
        assert!(!trie.erase(b"ni"));
        assert_eq!(trie.exact_match_search(b"ni"), None);
        assert_eq!(trie.exact_match_search(b"nihao"), Some(2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn prefix_search_visits_in_length_order() {
        let mut trie: Trie<i32> = Trie::new();
        trie.set(b"n", 1);
        trie.set(b"ni", 2);
        trie.set(b"nihao", 3);
        trie.set(b"x", 9);

        let mut seen = Vec::new();
        trie.prefix_search(b"nihao", |key, v| seen.push((key.to_vec(), v)));
        assert_eq!(
            seen,
            vec![
                (b"n".to_vec(), 1),
                (b"ni".to_vec(), 2),
                (b"nihao".to_vec(), 3)
            ]
        );
    }

    #[test]
    fn save_load_roundtrip() {
        let mut trie: Trie<i32> = Trie::new();
        trie.set(b"zhong", 5);
        trie.set(b"guo", 6);
        trie.erase(b"guo");

        let mut buf = Vec::new();
        trie.save(&mut buf).unwrap();

        let mut loaded: Trie<i32> = Trie::new();
        loaded.load(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded.exact_match_search(b"zhong"), Some(5));
        assert_eq!(loaded.exact_match_search(b"guo"), None);
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn two_blobs_share_one_stream() {
        let mut a: Trie<i32> = Trie::new();
        a.set(b"a", 1);
        let mut b: Trie<i32> = Trie::new();
        b.set(b"b", 2);

        let mut buf = Vec::new();
        a.save(&mut buf).unwrap();
        b.save(&mut buf).unwrap();

        let mut cur = Cursor::new(&buf);
        let mut a2: Trie<i32> = Trie::new();
        let mut b2: Trie<i32> = Trie::new();
        a2.load(&mut cur).unwrap();
        b2.load(&mut cur).unwrap();
        assert_eq!(a2.exact_match_search(b"a"), Some(1));
        assert_eq!(b2.exact_match_search(b"b"), Some(2));
    }
}
