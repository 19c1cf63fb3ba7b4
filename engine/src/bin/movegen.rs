//! Reference move-generation process.
//!
//! Speaks the line protocol the bridge expects and answers every request
//! with exactly one line:
//!
//! - `position fen <FEN>` -> `ok`, or `error <reason>`
//! - `getmoves` -> space-separated moves such as `e2e4 g1f3` (empty when
//!   there are none)
//! - `quit` -> exits without replying

use std::io::{self, BufRead, Write};

use cozy_chess::{Board, File, Move, Piece};

enum Reply {
    Line(String),
    Quit,
}

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut board = Board::default();

    for line in stdin.lock().lines() {
        match handle_command(&mut board, line?.trim()) {
            Reply::Line(reply) => {
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
            }
            Reply::Quit => break,
        }
    }
    Ok(())
}

fn handle_command(board: &mut Board, command: &str) -> Reply {
    if let Some(fen) = command.strip_prefix("position fen ") {
        return Reply::Line(match fen.trim().parse::<Board>() {
            Ok(parsed) => {
                *board = parsed;
                "ok".to_string()
            }
            Err(e) => format!("error {:?}", e),
        });
    }

    match command {
        "getmoves" => Reply::Line(list_moves(board).join(" ")),
        "quit" => Reply::Quit,
        _ => Reply::Line("unknown command".to_string()),
    }
}

/// Legal moves as from/to pairs, one entry per pair.
fn list_moves(board: &Board) -> Vec<String> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        for mv in mvs {
            let text = format_move(board, mv);
            if !moves.contains(&text) {
                moves.push(text);
            }
        }
        false
    });
    moves
}

/// Format as from/to squares, promotion dropped.
///
/// cozy-chess writes castling as the king capturing its own rook (e1h1);
/// the protocol wants the king's two-square move (e1g1).
fn format_move(board: &Board, mv: Move) -> String {
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if is_castle {
        let file = if mv.to.file() > mv.from.file() {
            File::G
        } else {
            File::C
        };
        return format!("{}{}{}", mv.from, file, mv.from.rank());
    }
    format!("{}{}", mv.from, mv.to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(board: &mut Board, command: &str) -> String {
        match handle_command(board, command) {
            Reply::Line(line) => line,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let mut board = Board::default();
        let moves = reply(&mut board, "getmoves");
        assert_eq!(moves.split(' ').count(), 20);
        assert!(moves.split(' ').any(|mv| mv == "e2e4"));
        assert!(moves.split(' ').any(|mv| mv == "g1f3"));
    }

    #[test]
    fn test_castling_is_reported_as_king_two_step() {
        let mut board = Board::default();
        assert_eq!(
            reply(&mut board, "position fen r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"),
            "ok"
        );
        let moves = reply(&mut board, "getmoves");
        let moves: Vec<&str> = moves.split(' ').collect();
        assert!(moves.contains(&"e1g1"));
        assert!(moves.contains(&"e1c1"));
        assert!(!moves.contains(&"e1h1"));
        assert!(!moves.contains(&"e1a1"));
    }

    #[test]
    fn test_promotions_collapse_to_one_move() {
        let mut board = Board::default();
        reply(&mut board, "position fen 7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let moves = reply(&mut board, "getmoves");
        assert_eq!(moves.split(' ').filter(|mv| *mv == "a7a8").count(), 1);
    }

    #[test]
    fn test_checkmate_gives_empty_line() {
        let mut board = Board::default();
        reply(
            &mut board,
            "position fen rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        );
        assert_eq!(reply(&mut board, "getmoves"), "");
    }

    #[test]
    fn test_bad_fen_and_unknown_command() {
        let mut board = Board::default();
        assert!(reply(&mut board, "position fen not-a-fen").starts_with("error"));
        assert_eq!(reply(&mut board, "go depth 3"), "unknown command");
        assert!(matches!(handle_command(&mut board, "quit"), Reply::Quit));
    }
}
