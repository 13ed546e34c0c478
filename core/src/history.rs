//! Two-tier history bigram learner.
//!
//! Committed sentences feed a bounded `recent` tier that remembers the exact
//! sentences; overflow drains into an unbounded `consolidated` tier whose
//! counts are decayed when blended back in. Both tiers keep their unigram and
//! bigram counters in [`Trie`]s, the bigram keyed as `"{w1}|{w2}"`.
//!
//! Scoring is in log10 probabilities and never fails; zero evidence yields
//! the configurable unknown floor.

use std::collections::VecDeque;
use std::io::{Read, Write};

use crate::errors::{Error, Result};
use crate::trie::Trie;

/// Weight applied to consolidated-tier counts when blending with recent ones.
const DECAY: f32 = 0.05;

/// Sentences the recent tier keeps verbatim before consolidating.
pub const RECENT_CAPACITY: usize = 8192;

/// Floor score when history holds no evidence at all.
const DEFAULT_UNKNOWN: f32 = -5.0;

/// Interpolation between bigram and unigram evidence.
const BIGRAM_WEIGHT: f32 = 0.68;
const UNIGRAM_WEIGHT: f32 = 1.0 - BIGRAM_WEIGHT;

/// Separator between the two words of a bigram key; never occurs in a word.
const BIGRAM_SEP: u8 = b'|';

/// Upper bounds for persisted length fields; anything larger is a broken file.
const MAX_SENTENCE_WORDS: u32 = 1 << 16;
const MAX_WORD_BYTES: u32 = 1 << 16;

fn bigram_key(w1: &str, w2: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(w1.len() + 1 + w2.len());
    key.extend_from_slice(w1.as_bytes());
    key.push(BIGRAM_SEP);
    key.extend_from_slice(w2.as_bytes());
    key
}

/// One tier of the learner: raw counts plus, when bounded, the recency deque.
#[derive(Debug)]
struct HistoryBigramPool {
    /// 0 means the unbounded consolidated tier.
    max_size: usize,
    /// Sentences accumulated into this tier.
    size: usize,
    /// Newest sentence at the front. Only populated in bounded tiers.
    recent: VecDeque<Vec<String>>,
    unigram: Trie<i32>,
    bigram: Trie<i32>,
}

impl HistoryBigramPool {
    fn new(max_size: usize) -> Self {
        HistoryBigramPool {
            max_size,
            size: 0,
            recent: VecDeque::new(),
            unigram: Trie::new(),
            bigram: Trie::new(),
        }
    }

    fn clear(&mut self) {
        self.recent.clear();
        self.unigram.clear();
        self.bigram.clear();
        self.size = 0;
    }

    fn inc(trie: &mut Trie<i32>, key: &[u8]) {
        trie.update(key, |v| v + 1);
    }

    fn dec(trie: &mut Trie<i32>, key: &[u8]) {
        let Some(v) = trie.exact_match_search(key) else {
            return;
        };
        if v <= 1 {
            trie.erase(key);
        } else {
            trie.set(key, v - 1);
        }
    }

    /// Count one sentence into this tier.
    fn add(&mut self, sentence: Vec<String>) {
        if sentence.is_empty() {
            return;
        }
        for (i, word) in sentence.iter().enumerate() {
            Self::inc(&mut self.unigram, word.as_bytes());
            if let Some(next) = sentence.get(i + 1) {
                Self::inc(&mut self.bigram, &bigram_key(word, next));
            }
        }
        if self.max_size != 0 {
            self.recent.push_front(sentence);
        }
        self.size += 1;
    }

    /// Pop the oldest sentence and subtract its counts.
    fn evict_oldest(&mut self) -> Option<Vec<String>> {
        let sentence = self.recent.pop_back()?;
        for (i, word) in sentence.iter().enumerate() {
            Self::dec(&mut self.unigram, word.as_bytes());
            if let Some(next) = sentence.get(i + 1) {
                Self::dec(&mut self.bigram, &bigram_key(word, next));
            }
        }
        self.size -= 1;
        Some(sentence)
    }

    fn unigram_freq(&self, w: &str) -> i32 {
        self.unigram.exact_match_search(w.as_bytes()).unwrap_or(0)
    }

    fn bigram_freq(&self, w1: &str, w2: &str) -> i32 {
        self.bigram
            .exact_match_search(&bigram_key(w1, w2))
            .unwrap_or(0)
    }
}

/// History learner blending a bounded recent tier with a decayed
/// consolidated tier.
///
/// Not internally synchronized; a host sharing one instance across sessions
/// must serialize `add`/`load`/`save`/`clear` itself.
#[derive(Debug)]
pub struct HistoryBigram {
    recent: HistoryBigramPool,
    consolidated: HistoryBigramPool,
    unknown: f32,
}

impl Default for HistoryBigram {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBigram {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }

    /// Build a learner whose recent tier holds at most `capacity` sentences.
    pub fn with_capacity(capacity: usize) -> Self {
        HistoryBigram {
            recent: HistoryBigramPool::new(capacity.max(1)),
            consolidated: HistoryBigramPool::new(0),
            unknown: DEFAULT_UNKNOWN,
        }
    }

    /// Feed one observed sentence. The oldest recent sentence is consolidated
    /// first whenever the recent tier is full.
    pub fn add<S: AsRef<str>>(&mut self, sentence: &[S]) {
        if sentence.is_empty() {
            return;
        }
        while self.recent.recent.len() >= self.recent.max_size {
            if let Some(old) = self.recent.evict_oldest() {
                self.consolidated.add(old);
            } else {
                break;
            }
        }
        self.recent
            .add(sentence.iter().map(|w| w.as_ref().to_string()).collect());
    }

    /// Blended unigram frequency of `w` across both tiers.
    pub fn unigram_freq(&self, w: &str) -> f32 {
        self.recent.unigram_freq(w) as f32 + self.consolidated.unigram_freq(w) as f32 * DECAY
    }

    /// Blended bigram frequency of the pair `(w1, w2)`.
    pub fn bigram_freq(&self, w1: &str, w2: &str) -> f32 {
        self.recent.bigram_freq(w1, w2) as f32
            + self.consolidated.bigram_freq(w1, w2) as f32 * DECAY
    }

    fn total_size(&self) -> f32 {
        self.recent.size as f32 + self.consolidated.size as f32 * DECAY
    }

    /// True when the history carries no evidence for `w`.
    pub fn is_unknown(&self, w: &str) -> bool {
        w.is_empty() || self.unigram_freq(w) == 0.0
    }

    /// Set the floor score returned when history has zero evidence.
    pub fn set_unknown(&mut self, unknown: f32) {
        self.unknown = unknown;
    }

    /// Log10 probability of `cur` following `prev`, per the fixed
    /// bigram/unigram interpolation. Always <= 0.
    pub fn score(&self, prev: &str, cur: &str) -> f32 {
        let uf0 = self.unigram_freq(prev);
        let bf = self.bigram_freq(prev, cur);
        let uf1 = self.unigram_freq(cur);

        // 0.5 guards the divisions against zero and small-sample overconfidence.
        let mut pr = 0.0f32;
        pr += BIGRAM_WEIGHT * bf / (uf0 + 0.5);
        pr += UNIGRAM_WEIGHT * uf1 / (self.total_size() + 0.5);

        if pr >= 1.0 {
            return 0.0;
        }
        if pr == 0.0 {
            return self.unknown;
        }
        pr.log10()
    }

    /// Sentences currently held verbatim in the recent tier.
    pub fn recent_size(&self) -> usize {
        self.recent.size
    }

    /// Sentences consolidated out of the recent tier since the last clear.
    pub fn consolidated_size(&self) -> usize {
        self.consolidated.size
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.consolidated.clear();
    }

    /// Write both tiers: the recent sentence list (reverse recency order, so
    /// replaying `add` on load restores the deque), then the consolidated
    /// count tries as opaque blobs. Integers are little-endian u32.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&(self.recent.recent.len() as u32).to_le_bytes())?;
        for sentence in self.recent.recent.iter().rev() {
            writer.write_all(&(sentence.len() as u32).to_le_bytes())?;
            for word in sentence {
                writer.write_all(&(word.len() as u32).to_le_bytes())?;
                writer.write_all(word.as_bytes())?;
            }
        }
        self.consolidated.unigram.save(writer)?;
        self.consolidated.bigram.save(writer)?;
        Ok(())
    }

    /// Replace the contents from a stream written by [`HistoryBigram::save`].
    ///
    /// The learner is cleared before reading and cleared again on failure, so
    /// a truncated or corrupt stream leaves empty history rather than a mix.
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.clear();
        let result = self.load_inner(reader);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn load_inner<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let count = read_u32(reader)?;
        for _ in 0..count {
            let words = read_u32(reader)?;
            if words > MAX_SENTENCE_WORDS {
                return Err(Error::format(format!("sentence of {words} words")));
            }
            let mut sentence = Vec::with_capacity(words as usize);
            for _ in 0..words {
                let len = read_u32(reader)?;
                if len > MAX_WORD_BYTES {
                    return Err(Error::format(format!("word of {len} bytes")));
                }
                let mut buf = vec![0u8; len as usize];
                reader.read_exact(&mut buf)?;
                let word = String::from_utf8(buf)
                    .map_err(|_| Error::format("word is not valid utf-8"))?;
                sentence.push(word);
            }
            self.add(&sentence);
        }
        self.consolidated.unigram.load(reader)?;
        self.consolidated.bigram.load(reader)?;
        Ok(())
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
