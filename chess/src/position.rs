//! The position value passed between the codec, the move applier and the UI.

use crate::square::Square;
use crate::types::{Piece, PieceColor, PieceKind, SquareValue};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Board grid indexed `[rank][file]`, rank 0 being rank "1".
pub type Board = [[SquareValue; 8]; 8];

/// Four-bit castling mask in `K, Q, k, q` order, high bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 0b1000;
    pub const WHITE_QUEENSIDE: u8 = 0b0100;
    pub const BLACK_KINGSIDE: u8 = 0b0010;
    pub const BLACK_QUEENSIDE: u8 = 0b0001;

    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    /// Bits above the low nibble are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn remove(&mut self, flags: u8) {
        self.0 &= !flags;
    }

    /// Both flags belonging to `color`.
    pub fn for_color(color: PieceColor) -> u8 {
        match color {
            PieceColor::White => Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE,
            PieceColor::Black => Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE,
        }
    }

    /// Flag guarded by the rook starting on `square`, if it is a corner.
    pub fn for_corner(square: Square) -> Option<u8> {
        match (square.file(), square.rank()) {
            (7, 0) => Some(Self::WHITE_KINGSIDE),
            (0, 0) => Some(Self::WHITE_QUEENSIDE),
            (7, 7) => Some(Self::BLACK_KINGSIDE),
            (0, 7) => Some(Self::BLACK_QUEENSIDE),
            _ => None,
        }
    }

    /// Parse a FEN castling field. Letters other than `KQkq` are ignored.
    pub fn from_fen(field: &str) -> Self {
        let mut bits = 0;
        for c in field.chars() {
            bits |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            };
        }
        Self(bits)
    }

    pub fn to_fen(self) -> String {
        let field: String = [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, c)| c)
        .collect();

        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }
}

/// A full game position. Positions are values: moving produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,
    pub turn: PieceColor,
    pub castling: CastlingRights,
    /// Verbatim en-passant field; `None` stands for `-`.
    pub en_passant: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    /// An empty board, White to move, no rights.
    pub fn empty() -> Self {
        Self {
            board: [[SquareValue::EMPTY; 8]; 8],
            turn: PieceColor::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn starting() -> Self {
        let mut position = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back_rank.into_iter().enumerate() {
            position.board[0][file] = Piece::new(kind, PieceColor::White).into();
            position.board[7][file] = Piece::new(kind, PieceColor::Black).into();
            position.board[1][file] = Piece::new(PieceKind::Pawn, PieceColor::White).into();
            position.board[6][file] = Piece::new(PieceKind::Pawn, PieceColor::Black).into();
        }
        position.castling = CastlingRights::ALL;
        position
    }

    pub fn square(&self, square: Square) -> SquareValue {
        self.board[square.rank() as usize][square.file() as usize]
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.square(square).piece()
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.rank() as usize][square.file() as usize] = piece.into();
    }

    /// Same position with the other side to move.
    pub fn with_turn_advanced(mut self) -> Self {
        self.turn = self.turn.opposite();
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_fen_field() {
        assert_eq!(CastlingRights::from_fen("KQkq"), CastlingRights::ALL);
        assert_eq!(CastlingRights::from_fen("-"), CastlingRights::NONE);
        assert_eq!(CastlingRights::from_fen("Kq").bits(), 0b1001);
        assert_eq!(CastlingRights::from_fen("qK").to_fen(), "Kq");
        assert_eq!(CastlingRights::NONE.to_fen(), "-");
    }

    #[test]
    fn test_remove_clears_only_named_flags() {
        let mut rights = CastlingRights::ALL;
        rights.remove(CastlingRights::for_color(PieceColor::White));
        assert_eq!(rights.to_fen(), "kq");
        rights.remove(CastlingRights::BLACK_QUEENSIDE);
        assert_eq!(rights.to_fen(), "k");
    }

    #[test]
    fn test_starting_position_layout() {
        let position = Position::starting();
        let e1: Square = "e1".parse().unwrap();
        let d8: Square = "d8".parse().unwrap();
        assert_eq!(
            position.piece_at(e1),
            Some(Piece::new(PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            position.piece_at(d8),
            Some(Piece::new(PieceKind::Queen, PieceColor::Black))
        );
        assert!(position.piece_at("e4".parse().unwrap()).is_none());
        assert_eq!(position.turn, PieceColor::White);
        assert_eq!(position.castling, CastlingRights::ALL);
    }

    #[test]
    fn test_turn_advance_is_a_copy() {
        let position = Position::starting();
        let next = position.clone().with_turn_advanced();
        assert_eq!(position.turn, PieceColor::White);
        assert_eq!(next.turn, PieceColor::Black);
        assert_eq!(position.board, next.board);
    }
}
