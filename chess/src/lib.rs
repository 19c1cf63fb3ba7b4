pub mod apply;
pub mod board_display;
pub mod fen;
pub mod moves;
pub mod position;
pub mod square;
pub mod types;

pub use apply::{apply_move, update_castling_rights, ApplyError};
pub use board_display::BoardDiagram;
pub use fen::{format_fen, parse_fen, FenError};
pub use moves::{parse_move_list, Move, MoveParseError};
pub use position::{Board, CastlingRights, Position, STARTING_FEN};
pub use square::{Square, SquareError};
pub use types::{decode, encode, Piece, PieceColor, PieceError, PieceKind, SquareValue};
