//! Board coordinates.

use std::fmt;
use std::str::FromStr;

/// A board coordinate. File 0 is "a", rank 0 is "1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid square: {0}")]
pub struct SquareError(pub String);

impl Square {
    /// `None` when either coordinate is off the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    pub fn from_index(index: u8) -> Option<Self> {
        (index < 64).then_some(Self {
            file: index % 8,
            rank: index / 8,
        })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Linear index `rank * 8 + file`.
    pub fn index(self) -> u8 {
        self.rank * 8 + self.file
    }

    /// Shift by a file and rank delta, staying on the board.
    pub fn offset(self, files: i8, ranks: i8) -> Option<Self> {
        let file = u8::try_from((self.file as i8).checked_add(files)?).ok()?;
        let rank = u8::try_from((self.rank as i8).checked_add(ranks)?).ok()?;
        Self::new(file, rank)
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Self::new(file, rank).ok_or_else(|| SquareError(s.to_string()))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
