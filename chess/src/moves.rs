//! From/to moves and the 4-character move notation used by the engine.

use std::fmt;
use std::str::FromStr;

use crate::square::Square;

/// A move from one square to another. There is no promotion field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid square index: {0}")]
    InvalidIndex(u8),
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    pub fn from_indices(from: u8, to: u8) -> Result<Self, MoveParseError> {
        let from = Square::from_index(from).ok_or(MoveParseError::InvalidIndex(from))?;
        let to = Square::from_index(to).ok_or(MoveParseError::InvalidIndex(to))?;
        Ok(Self { from, to })
    }

    /// Signed linear distance `to - from`.
    pub fn offset(self) -> i8 {
        self.to.index() as i8 - self.from.index() as i8
    }

    pub fn file_delta(self) -> i8 {
        self.to.file() as i8 - self.from.file() as i8
    }

    pub fn rank_delta(self) -> i8 {
        self.to.rank() as i8 - self.from.rank() as i8
    }
}

/// Parse move notation (e2e4)
impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.is_ascii() {
            return Err(MoveParseError::InvalidMove(s.to_string()));
        }
        let from = s[0..2]
            .parse()
            .map_err(|_| MoveParseError::InvalidMove(s.to_string()))?;
        let to = s[2..4]
            .parse()
            .map_err(|_| MoveParseError::InvalidMove(s.to_string()))?;
        Ok(Self { from, to })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Parse a `getmoves` reply: space-separated moves, possibly none.
pub fn parse_move_list(text: &str) -> Result<Vec<Move>, MoveParseError> {
    text.split_whitespace().map(str::parse).collect()
}
