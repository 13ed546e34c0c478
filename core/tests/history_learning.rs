// History learner behaviors exercised end to end:
// - bounded recent tier with consolidation at the 8192-sentence cap
// - persistence through a real file, including the consolidated tries

use shuru_core::HistoryBigram;

#[test]
fn recent_tier_caps_at_8192_sentences() {
    let mut h = HistoryBigram::new();
    let total = shuru_core::RECENT_CAPACITY + 37;
    for i in 0..total {
        h.add(&[format!("w{}", i % 100)]);
    }
    assert_eq!(h.recent_size(), shuru_core::RECENT_CAPACITY);
    assert_eq!(h.consolidated_size(), total - shuru_core::RECENT_CAPACITY);
}

#[test]
fn add_then_score_sees_the_effect() {
    let mut h = HistoryBigram::new();
    let before = h.score("你", "好");
    h.add(&["你", "好"]);
    let after = h.score("你", "好");
    assert!(after > before, "learning must raise the transition score");
    assert!(after <= 0.0);
}

#[test]
fn file_roundtrip() {
    let mut h = HistoryBigram::with_capacity(2);
    h.add(&["天", "气"]);
    h.add(&["很", "好"]);
    h.add(&["天", "气"]);

    let mut path = std::env::temp_dir();
    path.push(format!("shuru_history_{}.dat", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        h.save(&mut file).unwrap();
    }
    let mut loaded = HistoryBigram::with_capacity(2);
    {
        let mut file = std::fs::File::open(&path).unwrap();
        loaded.load(&mut file).unwrap();
    }
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.recent_size(), 2);
    assert_eq!(loaded.unigram_freq("天"), h.unigram_freq("天"));
    assert_eq!(loaded.bigram_freq("天", "气"), h.bigram_freq("天", "气"));
}

#[test]
fn garbage_stream_yields_empty_history_and_error() {
    let mut h = HistoryBigram::new();
    h.add(&["你", "好"]);
    let garbage = [0xffu8; 16];
    assert!(h.load(&mut std::io::Cursor::new(&garbage)).is_err());
    assert!(h.is_unknown("你"));
    assert_eq!(h.recent_size(), 0);
}
