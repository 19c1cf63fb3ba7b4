//! Applying a user-chosen move to a position.
//!
//! Legality is not computed here. The caller supplies the legal-move set
//! obtained from the move-generation process and this module checks
//! membership, then performs the board update including the en passant and
//! castling side effects. The side to move is left untouched.

use crate::moves::Move;
use crate::position::{CastlingRights, Position};
use crate::square::Square;
use crate::types::{PieceColor, PieceKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("Illegal move: {0}")]
    IllegalMove(Move),
}

/// Apply `mv` to a copy of `position`.
///
/// Fails with [`ApplyError::IllegalMove`] when `mv` is not in `legal_moves`
/// or its from-square is empty; `position` is never modified.
pub fn apply_move(
    position: &Position,
    mv: Move,
    legal_moves: &[Move],
) -> Result<Position, ApplyError> {
    if !legal_moves.contains(&mv) {
        return Err(ApplyError::IllegalMove(mv));
    }
    let piece = position.piece_at(mv.from).ok_or(ApplyError::IllegalMove(mv))?;

    let mut next = position.clone();
    let offset = mv.offset();

    // Diagonal pawn step onto an empty square captures the pawn that passed it.
    if piece.kind == PieceKind::Pawn
        && position.square(mv.to).is_empty()
        && matches!(offset.abs(), 7 | 9)
        && mv.file_delta().abs() == 1
    {
        if let Some(captured) = mv.to.offset(0, -piece.color.forward()) {
            next.set_piece(captured, None);
        }
    }

    if piece.kind == PieceKind::King && offset.abs() == 2 {
        let (rook_file, rook_step) = if offset > 0 { (7, -1) } else { (0, 1) };
        let rook_from = Square::new(rook_file, mv.to.rank());
        let rook_to = mv.to.offset(rook_step, 0);
        if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
            let rook = next.piece_at(rook_from);
            next.set_piece(rook_from, None);
            next.set_piece(rook_to, rook);
        }
    }

    next.set_piece(mv.from, None);
    next.set_piece(mv.to, Some(piece));

    next.castling = update_castling_rights(position.castling, piece.color, piece.kind, mv);
    next.en_passant = if piece.kind == PieceKind::Pawn && mv.rank_delta().abs() == 2 {
        mv.to
            .offset(0, -piece.color.forward())
            .map(|square| square.to_string())
    } else {
        None
    };

    Ok(next)
}

/// Recompute castling rights after `mv` by a piece of `color` and `kind`.
///
/// A king move drops both of its side's flags. Any move leaving or landing on
/// a corner drops that corner's flag: while a flag is set its rook still
/// stands on the corner, so leaving means the rook moved and landing means
/// it was captured.
pub fn update_castling_rights(
    rights: CastlingRights,
    color: PieceColor,
    kind: PieceKind,
    mv: Move,
) -> CastlingRights {
    let mut rights = rights;
    if kind == PieceKind::King {
        rights.remove(CastlingRights::for_color(color));
    }
    if kind == PieceKind::Rook && mv.from.rank() == color.back_rank() {
        if let Some(flag) = CastlingRights::for_corner(mv.from) {
            rights.remove(flag);
        }
    }
    if let Some(flag) = CastlingRights::for_corner(mv.to) {
        rights.remove(flag);
    }
    rights
}
