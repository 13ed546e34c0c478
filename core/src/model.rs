//! Language-model trait and the bundled in-memory n-gram provider.
//!
//! The decoder consumes any [`LanguageModel`]; the weight file format behind
//! a production model is not this crate's concern. [`NGramModel`] is the
//! reference provider: interned words, unigram/bigram log10 probabilities,
//! bincode artifacts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::errors::Result;

/// Index of a word in its model's vocabulary.
pub type WordIndex = u32;

/// Sentinel for words the model has never seen.
pub const UNKNOWN_WORD_INDEX: WordIndex = u32::MAX;

/// The begin-of-sentence sentinel word, interned at index 0.
pub const BOS_WORD: &str = "<s>";

const DEFAULT_UNKNOWN_LOG10: f32 = -8.0;

/// Bigram context carried along a decode path.
///
/// `prev == None` means no usable context (fresh state, or the path just
/// crossed an unknown word); scoring then falls back to unigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LmState {
    prev: Option<WordIndex>,
}

impl LmState {
    /// Context-free state: the next word scores as a unigram.
    pub fn empty() -> Self {
        LmState { prev: None }
    }

    fn after(idx: WordIndex) -> Self {
        LmState { prev: Some(idx) }
    }
}

/// Minimum surface the decoder needs from a language model.
///
/// Scores are log10 probabilities (<= 0 for proper distributions); scoring
/// never fails, unknown words land on [`LanguageModel::unknown_score`].
pub trait LanguageModel {
    /// Look up a word, [`UNKNOWN_WORD_INDEX`] when absent.
    fn word_index(&self, word: &str) -> WordIndex;

    /// Whether the model has no evidence for this word.
    fn is_unknown(&self, idx: WordIndex, word: &str) -> bool;

    /// Canonical initial state: begin-of-sentence context.
    fn begin_state(&self) -> LmState;

    /// Score `word` in `state`'s context, returning the successor state.
    fn score(&self, state: &LmState, idx: WordIndex, word: &str) -> (LmState, f32);

    /// Floor score for words the model does not know.
    fn unknown_score(&self) -> f32;
}

/// In-memory unigram + bigram model over interned words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NGramModel {
    words: Vec<String>,
    index: HashMap<String, WordIndex>,
    /// log10 P(w), parallel to `words`.
    unigram: Vec<f32>,
    /// log10 P(w2 | w1) keyed by index pair.
    bigram: HashMap<(WordIndex, WordIndex), f32>,
    unknown: f32,
}

impl Default for NGramModel {
    fn default() -> Self {
        Self::new()
    }
}

impl NGramModel {
    pub fn new() -> Self {
        let mut model = NGramModel {
            words: Vec::new(),
            index: HashMap::new(),
            unigram: Vec::new(),
            bigram: HashMap::new(),
            unknown: DEFAULT_UNKNOWN_LOG10,
        };
        // Index 0 is reserved for the begin-of-sentence sentinel.
        model.intern(BOS_WORD);
        model
    }

    fn intern(&mut self, word: &str) -> WordIndex {
        if let Some(&idx) = self.index.get(word) {
            return idx;
        }
        let idx = self.words.len() as WordIndex;
        self.words.push(word.to_string());
        self.index.insert(word.to_string(), idx);
        self.unigram.push(self.unknown);
        idx
    }

    /// Insert (or overwrite) a unigram log10 probability.
    pub fn insert_unigram(&mut self, word: &str, log_p: f32) -> WordIndex {
        let idx = self.intern(word);
        self.unigram[idx as usize] = log_p;
        idx
    }

    /// Insert a bigram log10 probability. Use [`BOS_WORD`] as `w1` for the
    /// begin-of-sentence transition.
    pub fn insert_bigram(&mut self, w1: &str, w2: &str, log_p: f32) {
        let i1 = self.intern(w1);
        let i2 = self.intern(w2);
        self.bigram.insert((i1, i2), log_p);
    }

    /// Adjust the floor used for unknown words.
    pub fn set_unknown_score(&mut self, score: f32) {
        self.unknown = score;
    }

    pub fn word(&self, idx: WordIndex) -> Option<&str> {
        self.words.get(idx as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        // The sentinel is always interned.
        self.words.len() <= 1
    }

    /// Save the model to `path` with bincode.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self).map_err(crate::errors::from_bincode)
    }

    /// Load a model previously written by [`NGramModel::save_bincode`].
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader).map_err(crate::errors::from_bincode)
    }
}

impl LanguageModel for NGramModel {
    fn word_index(&self, word: &str) -> WordIndex {
        self.index
            .get(word)
            .copied()
            .unwrap_or(UNKNOWN_WORD_INDEX)
    }

    fn is_unknown(&self, idx: WordIndex, word: &str) -> bool {
        idx == UNKNOWN_WORD_INDEX || word.is_empty()
    }

    fn begin_state(&self) -> LmState {
        LmState::after(0)
    }

    fn score(&self, state: &LmState, idx: WordIndex, word: &str) -> (LmState, f32) {
        if self.is_unknown(idx, word) {
            return (LmState::empty(), self.unknown);
        }
        let uni = self
            .unigram
            .get(idx as usize)
            .copied()
            .unwrap_or(self.unknown);
        let log_p = match state.prev {
            Some(prev) => self.bigram.get(&(prev, idx)).copied().unwrap_or(uni),
            None => uni,
        };
        (LmState::after(idx), log_p)
    }

    fn unknown_score(&self) -> f32 {
        self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unigram_and_bigram_scoring() {
        let mut m = NGramModel::new();
        let ni = m.insert_unigram("你", -1.0);
        let hao = m.insert_unigram("好", -1.2);
        m.insert_bigram("你", "好", -0.2);

        let (state, s1) = m.score(&LmState::empty(), ni, "你");
        assert!((s1 - (-1.0)).abs() < 1e-6);

        // Bigram applies in 你-context, unigram otherwise.
        let (_, s2) = m.score(&state, hao, "好");
        assert!((s2 - (-0.2)).abs() < 1e-6);
        let (_, s3) = m.score(&LmState::empty(), hao, "好");
        assert!((s3 - (-1.2)).abs() < 1e-6);
    }

    #[test]
    fn begin_of_sentence_transition() {
        let mut m = NGramModel::new();
        let wo = m.insert_unigram("我", -1.5);
        m.insert_bigram(BOS_WORD, "我", -0.4);

        let (_, s) = m.score(&m.begin_state(), wo, "我");
        assert!((s - (-0.4)).abs() < 1e-6);
    }

    #[test]
    fn unknown_words_hit_the_floor() {
        let m = NGramModel::new();
        assert_eq!(m.word_index("冷"), UNKNOWN_WORD_INDEX);
        assert!(m.is_unknown(UNKNOWN_WORD_INDEX, "冷"));
        let (state, s) = m.score(&m.begin_state(), UNKNOWN_WORD_INDEX, "冷");
        assert_eq!(s, m.unknown_score());
        // Context is lost after an unknown word.
        assert_eq!(state, LmState::empty());
    }

    #[test]
    fn bincode_roundtrip() {
        let mut m = NGramModel::new();
        m.insert_unigram("你", -1.0);
        m.insert_bigram("你", "好", -0.2);

        let mut path = std::env::temp_dir();
        path.push(format!("shuru_ngram_{}.bincode", std::process::id()));
        m.save_bincode(&path).unwrap();
        let loaded = NGramModel::load_bincode(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.word_index("你"), m.word_index("你"));
        let idx = loaded.word_index("你");
        let (_, s) = loaded.score(&LmState::empty(), idx, "你");
        assert!((s - (-1.0)).abs() < 1e-6);
    }
}
