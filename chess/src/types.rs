//! Piece and color types plus the packed square encoding.
//!
//! A square's content is stored as a single byte: bits 0-2 hold the piece
//! type and bits 3-4 hold the color. [`SquareValue`] can only be built from
//! a valid combination, so board storage stays compact while every boundary
//! works with the tagged [`Piece`] type.

/// Raw type bits.
pub const NONE: u8 = 0;
pub const PAWN: u8 = 1;
pub const KNIGHT: u8 = 2;
pub const BISHOP: u8 = 3;
pub const ROOK: u8 = 4;
pub const QUEEN: u8 = 5;
pub const KING: u8 = 6;

/// Raw color bits.
pub const WHITE: u8 = 8;
pub const BLACK: u8 = 16;

pub const TYPE_MASK: u8 = 0b0_0111;
pub const COLOR_MASK: u8 = 0b1_1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PieceError {
    #[error("Invalid piece value: {0:#07b}")]
    InvalidPiece(u8),
}

/// Project-owned piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Project-owned color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    White,
    Black,
}

/// A colored piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl PieceKind {
    pub fn bits(self) -> u8 {
        match self {
            Self::Pawn => PAWN,
            Self::Knight => KNIGHT,
            Self::Bishop => BISHOP,
            Self::Rook => ROOK,
            Self::Queen => QUEEN,
            Self::King => KING,
        }
    }

    /// `None` for the empty type and for the invalid value 7.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            PAWN => Some(Self::Pawn),
            KNIGHT => Some(Self::Knight),
            BISHOP => Some(Self::Bishop),
            ROOK => Some(Self::Rook),
            QUEEN => Some(Self::Queen),
            KING => Some(Self::King),
            _ => None,
        }
    }

    pub fn to_char_upper(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub fn to_char_lower(self) -> char {
        self.to_char_upper().to_ascii_lowercase()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

impl PieceColor {
    pub fn bits(self) -> u8 {
        match self {
            Self::White => WHITE,
            Self::Black => BLACK,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            WHITE => Some(Self::White),
            BLACK => Some(Self::Black),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Board row holding this color's king and rooks at the start.
    pub fn back_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Rank direction this color's pawns advance in.
    pub fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Piece {
    pub fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        match self.color {
            PieceColor::White => self.kind.to_char_upper(),
            PieceColor::Black => self.kind.to_char_lower(),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Self { kind, color })
    }
}

/// Packed content of one board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SquareValue(u8);

impl SquareValue {
    pub const EMPTY: Self = Self(NONE);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == NONE
    }

    pub fn piece(self) -> Option<Piece> {
        let kind = PieceKind::from_bits(self.0 & TYPE_MASK)?;
        let color = PieceColor::from_bits(self.0 & COLOR_MASK)?;
        Some(Piece { kind, color })
    }

    pub fn kind(self) -> Option<PieceKind> {
        PieceKind::from_bits(self.0 & TYPE_MASK)
    }

    pub fn color(self) -> Option<PieceColor> {
        PieceColor::from_bits(self.0 & COLOR_MASK)
    }
}

impl From<Piece> for SquareValue {
    fn from(piece: Piece) -> Self {
        Self(piece.kind.bits() | piece.color.bits())
    }
}

impl From<Option<Piece>> for SquareValue {
    fn from(piece: Option<Piece>) -> Self {
        piece.map_or(Self::EMPTY, Self::from)
    }
}

impl TryFrom<u8> for SquareValue {
    type Error = PieceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let (kind, color) = decode(value)?;
        encode(kind, color)
    }
}

/// Combine raw type and color bits into a square value.
///
/// The empty type must be colorless and every piece must carry exactly one
/// color; anything else, including type 7, is rejected.
pub fn encode(kind: u8, color: u8) -> Result<SquareValue, PieceError> {
    let value = kind | color;
    if kind & !TYPE_MASK != 0 || color & !COLOR_MASK != 0 {
        return Err(PieceError::InvalidPiece(value));
    }
    match (kind, color) {
        (NONE, NONE) => Ok(SquareValue::EMPTY),
        (PAWN..=KING, WHITE | BLACK) => Ok(SquareValue(value)),
        _ => Err(PieceError::InvalidPiece(value)),
    }
}

/// Split a raw square value into its `(type, color)` bits.
pub fn decode(value: u8) -> Result<(u8, u8), PieceError> {
    if value & !(TYPE_MASK | COLOR_MASK) != 0 {
        return Err(PieceError::InvalidPiece(value));
    }
    let kind = value & TYPE_MASK;
    let color = value & COLOR_MASK;
    match (kind, color) {
        (NONE, NONE) | (PAWN..=KING, WHITE | BLACK) => Ok((kind, color)),
        _ => Err(PieceError::InvalidPiece(value)),
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char_upper())
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
