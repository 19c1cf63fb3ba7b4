//! Plain-text board diagram for terminals and logs.

use std::fmt;

use crate::position::Position;

/// Renders a position with rank 8 at the top and White's pieces in uppercase.
pub struct BoardDiagram<'a>(pub &'a Position);

impl fmt::Display for BoardDiagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.0;
        for (row_idx, row) in position.board.iter().enumerate().rev() {
            write!(f, "{} ", row_idx + 1)?;
            for square in row {
                let c = square.piece().map_or('.', |piece| piece.to_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(
            f,
            "{} to move, castling {}, en passant {}",
            position.turn,
            position.castling.to_fen(),
            position.en_passant.as_deref().unwrap_or("-")
        )
    }
}
