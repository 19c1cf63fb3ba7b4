use crate::position::{Board, CastlingRights, Position};
use crate::types::{Piece, PieceColor, SquareValue};

/// Parse a FEN string into a Position
pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let fields: Vec<&str> = fen.split(' ').collect();
    let [placement, turn, castling, en_passant, halfmove, fullmove] = fields[..] else {
        return Err(FenError::FieldCount(fields.len()));
    };

    Ok(Position {
        board: parse_placement(placement)?,
        turn: if turn == "w" {
            PieceColor::White
        } else {
            PieceColor::Black
        },
        castling: CastlingRights::from_fen(castling),
        en_passant: (en_passant != "-").then(|| en_passant.to_string()),
        halfmove_clock: parse_counter("half-move clock", halfmove)?,
        fullmove_number: parse_counter("full-move number", fullmove)?,
    })
}

/// Format a Position as a FEN string
pub fn format_fen(position: &Position) -> String {
    format!(
        "{} {} {} {} {} {}",
        format_placement(&position.board),
        match position.turn {
            PieceColor::White => 'w',
            PieceColor::Black => 'b',
        },
        position.castling.to_fen(),
        position.en_passant.as_deref().unwrap_or("-"),
        position.halfmove_clock,
        position.fullmove_number,
    )
}

/// Text lists rank 8 first; the board stores rank 1 first.
fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut board = [[SquareValue::EMPTY; 8]; 8];
    for (text_idx, rank_str) in ranks.iter().enumerate() {
        let row = &mut board[7 - text_idx];
        let rank_name = (b'8' - text_idx as u8) as char;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                let piece = Piece::from_char(c).ok_or(FenError::UnknownPiece(c))?;
                if file < 8 {
                    row[file] = piece.into();
                }
                file += 1;
            }
            if file > 8 {
                break;
            }
        }
        if file != 8 {
            return Err(FenError::RankWidth {
                rank: rank_name,
                files: file,
            });
        }
    }
    Ok(board)
}

fn format_placement(board: &Board) -> String {
    board
        .iter()
        .rev()
        .map(|row| {
            let mut rank_str = String::new();
            let mut empty = 0;
            for square in row {
                match square.piece() {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            rank_str.push_str(&empty.to_string());
                            empty = 0;
                        }
                        rank_str.push(piece.to_char());
                    }
                }
            }
            if empty > 0 {
                rank_str.push_str(&empty.to_string());
            }
            rank_str
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_counter(field: &'static str, value: &str) -> Result<u32, FenError> {
    value.parse().map_err(|_| FenError::InvalidCounter {
        field,
        value: value.to_string(),
    })
}

/// Every variant is a form of malformed notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Malformed FEN: expected 6 space-separated fields, found {0}")]
    FieldCount(usize),
    #[error("Malformed FEN: expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("Malformed FEN: rank {rank} covers {files} files instead of 8")]
    RankWidth { rank: char, files: usize },
    #[error("Malformed FEN: unrecognized piece '{0}'")]
    UnknownPiece(char),
    #[error("Malformed FEN: invalid {field} '{value}'")]
    InvalidCounter { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::STARTING_FEN;
    use crate::square::Square;
    use crate::types::PieceKind;

    #[test]
    fn test_starting_fen_round_trips() {
        let position = parse_fen(STARTING_FEN).unwrap();
        assert_eq!(position, Position::starting());
        assert_eq!(format_fen(&position), STARTING_FEN);
    }

    #[test]
    fn test_rank_one_is_row_zero() {
        let position = parse_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 3 17").unwrap();
        assert_eq!(
            position.board[0][0].piece(),
            Some(Piece::new(PieceKind::Rook, PieceColor::White))
        );
        assert_eq!(
            position.piece_at("e8".parse::<Square>().unwrap()),
            Some(Piece::new(PieceKind::King, PieceColor::Black))
        );
        assert_eq!(position.turn, PieceColor::Black);
        assert_eq!(position.castling.bits(), CastlingRights::WHITE_QUEENSIDE);
        assert_eq!(position.halfmove_clock, 3);
        assert_eq!(position.fullmove_number, 17);
    }

    #[test]
    fn test_en_passant_field_is_verbatim() {
        let fen = "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3";
        let position = parse_fen(fen).unwrap();
        assert_eq!(position.en_passant.as_deref(), Some("e6"));
        assert_eq!(format_fen(&position), fen);

        let start = parse_fen(STARTING_FEN).unwrap();
        assert_eq!(start.en_passant, None);
    }

    #[test]
    fn test_turn_other_than_w_is_black() {
        let position = parse_fen("8/8/8/8/8/8/8/8 x - - 0 1").unwrap();
        assert_eq!(position.turn, PieceColor::Black);
    }

    #[test]
    fn test_no_castling_rights_serialize_as_dash() {
        let fen = "8/8/8/3k4/8/3K4/8/8 w - - 0 1";
        let position = parse_fen(fen).unwrap();
        assert_eq!(position.castling, CastlingRights::NONE);
        assert_eq!(format_fen(&position), fen);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - -"),
            Err(FenError::FieldCount(4))
        );
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8  w - - 0 1"),
            Err(FenError::FieldCount(7))
        ));
    }

    #[test]
    fn test_wrong_rank_count() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankCount(7))
        );
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankCount(9))
        );
    }

    #[test]
    fn test_wrong_rank_width() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/7 w - - 0 1"),
            Err(FenError::RankWidth { rank: '1', files: 7 })
        );
        assert!(matches!(
            parse_fen("9/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: '8', .. })
        ));
        assert!(matches!(
            parse_fen("8/8/8/ppppppppp/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: '5', .. })
        ));
    }

    #[test]
    fn test_unknown_piece_letter() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/7x w - - 0 1"),
            Err(FenError::UnknownPiece('x'))
        );
    }

    #[test]
    fn test_bad_counters() {
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::InvalidCounter { .. })
        ));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 w - - 0 -1"),
            Err(FenError::InvalidCounter { .. })
        ));
    }
}
