//! Dictionary mapping encoded syllable keys to phrases.
//!
//! Keys are the compact byte encodings produced by the pinyin layer (two
//! bytes per syllable), values are the phrases readable under that key. The
//! lexicon serves lookups from an in-memory map plus an optional artifact
//! pair: an FST index from key to payload slot and a bincode payload vector.
//! In-memory entries take precedence over the artifacts.

use fst::Map;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use crate::errors::{Error, Result};

/// One phrase readable under a key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LexEntry {
    pub word: String,
    pub freq: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    map: HashMap<Vec<u8>, Vec<LexEntry>>,
    fst_map: Option<Map<Vec<u8>>>,
    payloads: Option<Vec<Vec<LexEntry>>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phrase under an encoded key.
    pub fn insert<K: Into<Vec<u8>>, W: Into<String>>(&mut self, key: K, word: W, freq: u32) {
        self.map.entry(key.into()).or_default().push(LexEntry {
            word: word.into(),
            freq,
        });
    }

    /// All phrases stored under `key`.
    pub fn lookup(&self, key: &[u8]) -> Vec<LexEntry> {
        if let Some(entries) = self.map.get(key) {
            return entries.clone();
        }
        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            if let Some(idx) = map.get(key) {
                if let Some(entries) = payloads.get(idx as usize) {
                    return entries.clone();
                }
            }
        }
        Vec::new()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.payloads.as_ref().map_or(true, |p| p.is_empty())
    }

    /// Serialize the in-memory entries to the artifact pair as raw bytes.
    pub fn to_artifact_bytes(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut keys: Vec<&Vec<u8>> = self.map.keys().collect();
        keys.sort();

        let mut builder = fst::MapBuilder::memory();
        let mut payloads: Vec<Vec<LexEntry>> = Vec::with_capacity(keys.len());
        for key in keys {
            builder
                .insert(key, payloads.len() as u64)
                .map_err(|e| Error::format(e.to_string()))?;
            payloads.push(self.map[key].clone());
        }
        let fst_bytes = builder
            .into_inner()
            .map_err(|e| Error::format(e.to_string()))?;
        let payload_bytes =
            bincode::serialize(&payloads).map_err(crate::errors::from_bincode)?;
        Ok((fst_bytes, payload_bytes))
    }

    /// Rebuild a lexicon from bytes produced by [`Lexicon::to_artifact_bytes`].
    pub fn from_artifact_bytes(fst_bytes: Vec<u8>, payload_bytes: &[u8]) -> Result<Self> {
        let map = Map::new(fst_bytes).map_err(|e| Error::format(e.to_string()))?;
        let payloads: Vec<Vec<LexEntry>> =
            bincode::deserialize(payload_bytes).map_err(crate::errors::from_bincode)?;
        Ok(Lexicon {
            map: HashMap::new(),
            fst_map: Some(map),
            payloads: Some(payloads),
        })
    }

    /// Write `lexicon.fst` + `lexicon.bincode` style artifacts.
    pub fn save_artifacts<P: AsRef<Path>>(&self, fst_path: P, payload_path: P) -> Result<()> {
        let (fst_bytes, payload_bytes) = self.to_artifact_bytes()?;
        std::fs::write(fst_path, fst_bytes)?;
        let file = File::create(payload_path)?;
        let mut writer = BufWriter::new(file);
        std::io::Write::write_all(&mut writer, &payload_bytes)?;
        Ok(())
    }

    /// Load a lexicon from an artifact pair on disk.
    pub fn load_artifacts<P: AsRef<Path>>(fst_path: P, payload_path: P) -> Result<Self> {
        let mut fst_bytes = Vec::new();
        File::open(fst_path)?.read_to_end(&mut fst_bytes)?;
        let mut payload_bytes = Vec::new();
        File::open(payload_path)?.read_to_end(&mut payload_bytes)?;
        Self::from_artifact_bytes(fst_bytes, &payload_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut lex = Lexicon::new();
        lex.insert(vec![1u8, 2, 3, 4], "你好", 100);
        lex.insert(vec![1u8, 2, 3, 4], "拟好", 5);
        lex.insert(vec![9u8, 9], "中", 50);

        let entries = lex.lookup(&[1, 2, 3, 4]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "你好");
        assert!(lex.lookup(&[7, 7]).is_empty());
    }

    #[test]
    fn artifact_roundtrip() {
        let mut lex = Lexicon::new();
        lex.insert(vec![3u8, 10], "我", 80);
        lex.insert(vec![1u8, 2, 3, 4], "你好", 100);

        let (fst_bytes, payload_bytes) = lex.to_artifact_bytes().unwrap();
        let loaded = Lexicon::from_artifact_bytes(fst_bytes, &payload_bytes).unwrap();

        assert_eq!(loaded.lookup(&[3, 10]), lex.lookup(&[3, 10]));
        assert_eq!(loaded.lookup(&[1, 2, 3, 4]), lex.lookup(&[1, 2, 3, 4]));
        assert!(loaded.lookup(&[5]).is_empty());
    }
}
