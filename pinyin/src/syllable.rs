//! Mandarin syllable structure: initials, finals and the two-byte encoding.
//!
//! A syllable is a `(initial, final)` pair; the final is absent for an
//! incomplete syllable typed as a bare initial. Encoding packs a syllable
//! into two bytes, `(initial index + 1, final index + 1)`, with `0x00` in the
//! second byte marking "no final". The first byte is never zero.

use serde::{Deserialize, Serialize};
use shuru_core::{Error, Result};

/// The 23 consonant onsets plus the zero initial.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PinyinInitial {
    Zero = 0,
    B,
    P,
    M,
    F,
    D,
    T,
    N,
    L,
    G,
    K,
    H,
    J,
    Q,
    X,
    Zh,
    Ch,
    Sh,
    R,
    Z,
    C,
    S,
    Y,
    W,
}

impl PinyinInitial {
    pub const ALL: [PinyinInitial; 24] = [
        PinyinInitial::Zero,
        PinyinInitial::B,
        PinyinInitial::P,
        PinyinInitial::M,
        PinyinInitial::F,
        PinyinInitial::D,
        PinyinInitial::T,
        PinyinInitial::N,
        PinyinInitial::L,
        PinyinInitial::G,
        PinyinInitial::K,
        PinyinInitial::H,
        PinyinInitial::J,
        PinyinInitial::Q,
        PinyinInitial::X,
        PinyinInitial::Zh,
        PinyinInitial::Ch,
        PinyinInitial::Sh,
        PinyinInitial::R,
        PinyinInitial::Z,
        PinyinInitial::C,
        PinyinInitial::S,
        PinyinInitial::Y,
        PinyinInitial::W,
    ];

    pub fn spelling(self) -> &'static str {
        match self {
            PinyinInitial::Zero => "",
            PinyinInitial::B => "b",
            PinyinInitial::P => "p",
            PinyinInitial::M => "m",
            PinyinInitial::F => "f",
            PinyinInitial::D => "d",
            PinyinInitial::T => "t",
            PinyinInitial::N => "n",
            PinyinInitial::L => "l",
            PinyinInitial::G => "g",
            PinyinInitial::K => "k",
            PinyinInitial::H => "h",
            PinyinInitial::J => "j",
            PinyinInitial::Q => "q",
            PinyinInitial::X => "x",
            PinyinInitial::Zh => "zh",
            PinyinInitial::Ch => "ch",
            PinyinInitial::Sh => "sh",
            PinyinInitial::R => "r",
            PinyinInitial::Z => "z",
            PinyinInitial::C => "c",
            PinyinInitial::S => "s",
            PinyinInitial::Y => "y",
            PinyinInitial::W => "w",
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// The legal rime shapes, spelled as written after the initial.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PinyinFinal {
    A = 0,
    Ai,
    An,
    Ang,
    Ao,
    E,
    Ei,
    En,
    Eng,
    Er,
    I,
    Ia,
    Ian,
    Iang,
    Iao,
    Ie,
    In,
    Ing,
    Iong,
    Iu,
    O,
    Ong,
    Ou,
    U,
    Ua,
    Uai,
    Uan,
    Uang,
    Ue,
    Ui,
    Un,
    Uo,
    V,
    Ve,
    Ng,
}

impl PinyinFinal {
    pub const ALL: [PinyinFinal; 35] = [
        PinyinFinal::A,
        PinyinFinal::Ai,
        PinyinFinal::An,
        PinyinFinal::Ang,
        PinyinFinal::Ao,
        PinyinFinal::E,
        PinyinFinal::Ei,
        PinyinFinal::En,
        PinyinFinal::Eng,
        PinyinFinal::Er,
        PinyinFinal::I,
        PinyinFinal::Ia,
        PinyinFinal::Ian,
        PinyinFinal::Iang,
        PinyinFinal::Iao,
        PinyinFinal::Ie,
        PinyinFinal::In,
        PinyinFinal::Ing,
        PinyinFinal::Iong,
        PinyinFinal::Iu,
        PinyinFinal::O,
        PinyinFinal::Ong,
        PinyinFinal::Ou,
        PinyinFinal::U,
        PinyinFinal::Ua,
        PinyinFinal::Uai,
        PinyinFinal::Uan,
        PinyinFinal::Uang,
        PinyinFinal::Ue,
        PinyinFinal::Ui,
        PinyinFinal::Un,
        PinyinFinal::Uo,
        PinyinFinal::V,
        PinyinFinal::Ve,
        PinyinFinal::Ng,
    ];

    pub fn spelling(self) -> &'static str {
        match self {
            PinyinFinal::A => "a",
            PinyinFinal::Ai => "ai",
            PinyinFinal::An => "an",
            PinyinFinal::Ang => "ang",
            PinyinFinal::Ao => "ao",
            PinyinFinal::E => "e",
            PinyinFinal::Ei => "ei",
            PinyinFinal::En => "en",
            PinyinFinal::Eng => "eng",
            PinyinFinal::Er => "er",
            PinyinFinal::I => "i",
            PinyinFinal::Ia => "ia",
            PinyinFinal::Ian => "ian",
            PinyinFinal::Iang => "iang",
            PinyinFinal::Iao => "iao",
            PinyinFinal::Ie => "ie",
            PinyinFinal::In => "in",
            PinyinFinal::Ing => "ing",
            PinyinFinal::Iong => "iong",
            PinyinFinal::Iu => "iu",
            PinyinFinal::O => "o",
            PinyinFinal::Ong => "ong",
            PinyinFinal::Ou => "ou",
            PinyinFinal::U => "u",
            PinyinFinal::Ua => "ua",
            PinyinFinal::Uai => "uai",
            PinyinFinal::Uan => "uan",
            PinyinFinal::Uang => "uang",
            PinyinFinal::Ue => "ue",
            PinyinFinal::Ui => "ui",
            PinyinFinal::Un => "un",
            PinyinFinal::Uo => "uo",
            PinyinFinal::V => "v",
            PinyinFinal::Ve => "ve",
            PinyinFinal::Ng => "ng",
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// One syllable; the final is absent for a bare-initial partial syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinyinSyllable {
    pub initial: PinyinInitial,
    pub final_: Option<PinyinFinal>,
}

impl PinyinSyllable {
    pub fn new(initial: PinyinInitial, final_: Option<PinyinFinal>) -> Self {
        PinyinSyllable { initial, final_ }
    }

    /// Canonical spelling: initial followed by final.
    pub fn spelling(&self) -> String {
        let mut s = String::from(self.initial.spelling());
        if let Some(f) = self.final_ {
            s.push_str(f.spelling());
        }
        s
    }

    /// Append the two-byte encoding.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.initial.index() + 1);
        out.push(self.final_.map_or(0, |f| f.index() + 1));
    }

    pub fn encode(&self) -> [u8; 2] {
        let mut out = Vec::with_capacity(2);
        self.encode_into(&mut out);
        [out[0], out[1]]
    }

    /// Decode one two-byte unit.
    pub fn decode(bytes: [u8; 2]) -> Result<Self> {
        if bytes[0] == 0 {
            return Err(Error::InvalidFormat("zero initial byte".into()));
        }
        let initial = PinyinInitial::from_index(bytes[0] - 1)
            .ok_or_else(|| Error::InvalidFormat(format!("initial byte {}", bytes[0])))?;
        let final_ = match bytes[1] {
            0 => None,
            b => Some(
                PinyinFinal::from_index(b - 1)
                    .ok_or_else(|| Error::InvalidFormat(format!("final byte {b}")))?,
            ),
        };
        Ok(PinyinSyllable { initial, final_ })
    }
}

impl std::fmt::Display for PinyinSyllable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_roundtrip() {
        for (i, initial) in PinyinInitial::ALL.iter().enumerate() {
            assert_eq!(initial.index() as usize, i);
            assert_eq!(PinyinInitial::from_index(i as u8), Some(*initial));
        }
        for (i, final_) in PinyinFinal::ALL.iter().enumerate() {
            assert_eq!(final_.index() as usize, i);
            assert_eq!(PinyinFinal::from_index(i as u8), Some(*final_));
        }
        assert_eq!(PinyinInitial::from_index(24), None);
        assert_eq!(PinyinFinal::from_index(35), None);
    }

    #[test]
    fn encoding_reserves_zero() {
        let ni = PinyinSyllable::new(PinyinInitial::N, Some(PinyinFinal::I));
        let bytes = ni.encode();
        assert_ne!(bytes[0], 0);
        assert_eq!(PinyinSyllable::decode(bytes).unwrap(), ni);

        let bare = PinyinSyllable::new(PinyinInitial::Zh, None);
        let bytes = bare.encode();
        assert_eq!(bytes[1], 0);
        assert_eq!(PinyinSyllable::decode(bytes).unwrap(), bare);
        assert_eq!(bare.spelling(), "zh");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(PinyinSyllable::decode([0, 3]).is_err());
        assert!(PinyinSyllable::decode([200, 3]).is_err());
        assert!(PinyinSyllable::decode([1, 200]).is_err());
    }
}
