//! Fuzzy equivalence flags for pinyin parsing.
//!
//! Each flag relaxes the parser in one way: treating commonly confused
//! spellings as equivalent, accepting spelling corrections, or enabling more
//! aggressive segmentation. Configuration carries the rules as strings
//! (`"z=zh"`, `"an=ang"`, `"inner"`); [`FuzzyFlags::from_rules`] turns them
//! into the flag set handed to the parser.

use bitflags::bitflags;

bitflags! {
    /// Set of enabled fuzzy equivalences and parser relaxations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FuzzyFlags: u32 {
        /// gn typed for an ng coda ("niagn" for "niang").
        const NG_GN = 1 << 0;
        /// u typed for the umlaut final ("lu" also reads as "lv").
        const V_U = 1 << 1;
        const AN_ANG = 1 << 2;
        const EN_ENG = 1 << 3;
        const IAN_IANG = 1 << 4;
        const UAN_UANG = 1 << 5;
        const IN_ING = 1 << 6;
        const U_OU = 1 << 7;
        const C_CH = 1 << 8;
        const S_SH = 1 << 9;
        const Z_ZH = 1 << 10;
        const F_H = 1 << 11;
        const L_N = 1 << 12;
        const L_R = 1 << 13;
        /// Split a long syllable into complete shorter ones ("xian" -> "xi'an").
        const INNER = 1 << 14;
        /// Inner splitting down to three-letter syllables.
        const INNER_SHORT = 1 << 15;
        /// Accept any prefix of a final ("xio" for "xiong").
        const PARTIAL_FINAL = 1 << 16;
        /// Correction: v typed for u ("zhv" for "zhu").
        const CORRECT_V_U = 1 << 17;
        /// Correction: gn typed for ng, independent of the fuzzy pair.
        const CORRECT_NG_GN = 1 << 18;
        /// Emit every prefix match, not just the longest and its alternatives.
        const ADVANCE = 1 << 19;
    }
}

impl FuzzyFlags {
    /// Parse configuration rule strings into a flag set.
    ///
    /// Pair rules accept either order (`"z=zh"` and `"zh=z"` are the same
    /// rule); unrecognized strings are ignored.
    pub fn from_rules<S: AsRef<str>>(rules: &[S]) -> FuzzyFlags {
        let mut flags = FuzzyFlags::empty();
        for rule in rules {
            let rule = rule.as_ref().trim().to_ascii_lowercase();
            let canonical = match rule.split_once('=') {
                Some((a, b)) => {
                    let (a, b) = (a.trim(), b.trim());
                    if a <= b {
                        format!("{a}={b}")
                    } else {
                        format!("{b}={a}")
                    }
                }
                None => rule.clone(),
            };
            flags |= match canonical.as_str() {
                "gn=ng" => FuzzyFlags::NG_GN,
                "u=v" => FuzzyFlags::V_U,
                "an=ang" => FuzzyFlags::AN_ANG,
                "en=eng" => FuzzyFlags::EN_ENG,
                "ian=iang" => FuzzyFlags::IAN_IANG,
                "uan=uang" => FuzzyFlags::UAN_UANG,
                "in=ing" => FuzzyFlags::IN_ING,
                "ou=u" => FuzzyFlags::U_OU,
                "c=ch" => FuzzyFlags::C_CH,
                "s=sh" => FuzzyFlags::S_SH,
                "z=zh" => FuzzyFlags::Z_ZH,
                "f=h" => FuzzyFlags::F_H,
                "l=n" => FuzzyFlags::L_N,
                "l=r" => FuzzyFlags::L_R,
                "inner" => FuzzyFlags::INNER,
                "inner-short" => FuzzyFlags::INNER_SHORT,
                "partial-final" => FuzzyFlags::PARTIAL_FINAL,
                "correct-u=v" | "correct-v=u" => FuzzyFlags::CORRECT_V_U,
                "correct-gn=ng" | "correct-ng=gn" => FuzzyFlags::CORRECT_NG_GN,
                "advance" => FuzzyFlags::ADVANCE,
                _ => FuzzyFlags::empty(),
            };
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_strings_parse_in_either_order() {
        let a = FuzzyFlags::from_rules(&["z=zh", "an=ang", "inner"]);
        let b = FuzzyFlags::from_rules(&["zh=z", "ang=an", "inner"]);
        assert_eq!(a, b);
        assert!(a.contains(FuzzyFlags::Z_ZH));
        assert!(a.contains(FuzzyFlags::AN_ANG));
        assert!(a.contains(FuzzyFlags::INNER));
        assert!(!a.contains(FuzzyFlags::L_N));
    }

    #[test]
    fn unknown_rules_are_ignored()  {
        let flags = FuzzyFlags::from_rules(&["nonsense", "q=x"]);
        assert!(flags.is_empty());
    }

    #[test]
    fn union_is_bitwise_or() {
        let flags =
            FuzzyFlags::from_rules(&["l=n"]) | FuzzyFlags::from_rules(&["l=r"]);
        assert_eq!(flags, FuzzyFlags::L_N | FuzzyFlags::L_R);
    }
}
