//! The fixed seven-note alphabet and its pitch table.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A natural note in one octave. Declaration order is the sort order and
/// the bottom-to-top row order on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Note {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

const FREQUENCIES: [f32; 7] = [261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88];
const SYMBOLS: [char; 7] = ['c', 'd', 'e', 'f', 'g', 'a', 'b'];
// Semitone offsets from C
const SEMITONES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

impl Note {
    pub const ALL: [Note; 7] = [
        Note::C,
        Note::D,
        Note::E,
        Note::F,
        Note::G,
        Note::A,
        Note::B,
    ];

    /// Number of notes in the alphabet, and so the number of grid rows.
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Note> {
        Note::ALL.get(index).copied()
    }

    pub fn symbol(self) -> char {
        SYMBOLS[self.index()]
    }

    pub fn from_symbol(symbol: char) -> Result<Note> {
        let lower = symbol.to_ascii_lowercase();
        SYMBOLS
            .iter()
            .position(|&s| s == lower)
            .and_then(Note::from_index)
            .ok_or_else(|| Error::InvalidNoteSymbol(symbol.to_string()))
    }

    /// Frequency in Hz, fourth octave.
    pub fn frequency(self) -> f32 {
        FREQUENCIES[self.index()]
    }

    /// MIDI note number, with C mapped to middle C (60).
    pub fn midi_number(self) -> u8 {
        60 + SEMITONES[self.index()]
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol().to_ascii_uppercase())
    }
}

impl FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Note::from_symbol(c),
            _ => Err(Error::InvalidNoteSymbol(s.to_string())),
        }
    }
}

/// Looks up the pitch for a note symbol such as `"c"`.
pub fn note_to_frequency(symbol: &str) -> Result<f32> {
    symbol.parse::<Note>().map(Note::frequency)
}
