//! shuru-core
//!
//! Language-agnostic pieces of the shuru input-method engine: the byte-keyed
//! trie, the two-tier history bigram learner, the encoded-key lexicon and the
//! language-model trait with its in-memory n-gram provider. Language-specific
//! crates (shuru-pinyin) layer parsing and decoding on top.
//!
//! Public API:
//! - `Trie` - ordered byte-string map with stable serialization
//! - `HistoryBigram` - user-history learner with on-disk persistence
//! - `Lexicon` - encoded key -> phrase dictionary (FST + bincode artifacts)
//! - `LanguageModel` / `NGramModel` - scoring trait and bundled provider
//! - `Error` / `Result` - the error surface shared by both crates

pub mod errors;
pub use errors::{Error, Result};

pub mod trie;
pub use trie::Trie;

pub mod history;
pub use history::{HistoryBigram, RECENT_CAPACITY};

pub mod lexicon;
pub use lexicon::{LexEntry, Lexicon};

pub mod model;
pub use model::{LanguageModel, LmState, NGramModel, WordIndex, BOS_WORD, UNKNOWN_WORD_INDEX};
