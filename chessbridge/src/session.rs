//! Interactive play: the query-moves, choose, apply loop over one engine.

use std::str::FromStr;

use chess::{
    apply_move, format_fen, parse_fen, ApplyError, BoardDiagram, FenError, Move, Position,
};
use engine::{EngineBridge, EngineError};

pub const HELP: &str = "\
Commands:
  <move>       play a move in from/to form, e.g. e2e4
  moves        list the legal moves
  board        show the board
  fen [TEXT]   print the position as FEN, or load TEXT
  undo         take back the last move
  reload       rebuild and restart the engine
  help         show this message
  quit         leave";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Play(Move),
    Moves,
    Board,
    Fen(Option<String>),
    Undo,
    Reload,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "moves" => Self::Moves,
            "board" => Self::Board,
            "fen" if rest.is_empty() => Self::Fen(None),
            "fen" => Self::Fen(Some(rest.to_string())),
            "undo" => Self::Undo,
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ if rest.is_empty() => match word.parse::<Move>() {
                Ok(mv) => Self::Play(mv),
                Err(_) => return Err(SessionError::UnknownCommand(line.to_string())),
            },
            _ => return Err(SessionError::UnknownCommand(line.to_string())),
        };
        Ok(command)
    }
}

/// What the REPL should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

/// One game: the current position plus the positions before it.
pub struct Session {
    current: Position,
    history: Vec<Position>,
}

impl Session {
    pub fn new(start: Position) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Position {
        &self.current
    }

    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    /// Ask the engine for the legal moves, apply `mv`, and pass the turn.
    pub async fn play(&mut self, bridge: &EngineBridge, mv: Move) -> Result<&Position, SessionError> {
        let legal = bridge.legal_moves(&self.current).await?;
        let next = apply_move(&self.current, mv, &legal)?.with_turn_advanced();
        tracing::debug!("Played {}: {}", mv, format_fen(&next));
        self.history.push(std::mem::replace(&mut self.current, next));
        Ok(&self.current)
    }

    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Start over from `position`, discarding the history.
    pub fn reset(&mut self, position: Position) {
        self.current = position;
        self.history.clear();
    }

    pub async fn execute(
        &mut self,
        bridge: &EngineBridge,
        command: ReplCommand,
    ) -> Result<Outcome, SessionError> {
        let text = match command {
            ReplCommand::Play(mv) => BoardDiagram(self.play(bridge, mv).await?).to_string(),
            ReplCommand::Moves => {
                let moves = bridge.legal_moves(self.current()).await?;
                if moves.is_empty() {
                    "No legal moves".to_string()
                } else {
                    join_moves(&moves)
                }
            }
            ReplCommand::Board => BoardDiagram(self.current()).to_string(),
            ReplCommand::Fen(None) => format_fen(self.current()),
            ReplCommand::Fen(Some(text)) => {
                self.reset(parse_fen(&text)?);
                BoardDiagram(self.current()).to_string()
            }
            ReplCommand::Undo => {
                if self.undo() {
                    BoardDiagram(self.current()).to_string()
                } else {
                    "Nothing to undo".to_string()
                }
            }
            ReplCommand::Reload => {
                bridge.rebuild_and_restart().await?;
                "Engine rebuilt and restarted".to_string()
            }
            ReplCommand::Help => HELP.to_string(),
            ReplCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Print(text))
    }
}

pub fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{PieceColor, PieceKind};
    use engine::BridgeConfig;

    /// Answers `getmoves` with a fixed list and everything else with `ok`.
    const FAKE_ENGINE: &str =
        r#"while read line; do case "$line" in getmoves) echo "e2e4 d2d4";; *) echo ok;; esac; done"#;

    async fn fake_bridge() -> EngineBridge {
        let bridge = EngineBridge::new(BridgeConfig::new("sh").with_args(["-c", FAKE_ENGINE]));
        bridge.start().await.unwrap();
        bridge
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("moves".parse::<ReplCommand>().unwrap(), ReplCommand::Moves);
        assert_eq!(" board ".parse::<ReplCommand>().unwrap(), ReplCommand::Board);
        assert_eq!("fen".parse::<ReplCommand>().unwrap(), ReplCommand::Fen(None));
        assert_eq!(
            "fen 8/8/8/8/8/8/8/8 w - - 0 1".parse::<ReplCommand>().unwrap(),
            ReplCommand::Fen(Some("8/8/8/8/8/8/8/8 w - - 0 1".to_string()))
        );
        assert_eq!(
            "e2e4".parse::<ReplCommand>().unwrap(),
            ReplCommand::Play("e2e4".parse().unwrap())
        );
        assert_eq!("exit".parse::<ReplCommand>().unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "castle".parse::<ReplCommand>(),
            Err(SessionError::UnknownCommand(_))
        ));
        assert!(matches!(
            "e2e4 now".parse::<ReplCommand>(),
            Err(SessionError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_undo_stops_at_start() {
        let mut session = Session::new(Position::starting());
        assert!(!session.undo());
        assert_eq!(session.moves_played(), 0);
    }

    #[tokio::test]
    async fn test_play_and_undo() {
        let bridge = fake_bridge().await;
        let mut session = Session::new(Position::starting());

        let after = session.play(&bridge, "e2e4".parse().unwrap()).await.unwrap();
        assert_eq!(after.turn, PieceColor::Black);
        assert_eq!(after.en_passant.as_deref(), Some("e3"));
        let e4 = "e4".parse().unwrap();
        assert_eq!(after.piece_at(e4).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(session.moves_played(), 1);

        assert!(session.undo());
        assert_eq!(session.current(), &Position::starting());
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_undo_walks_back_through_every_move() {
        let bridge = fake_bridge().await;
        let mut session = Session::new(Position::starting());

        session.play(&bridge, "e2e4".parse().unwrap()).await.unwrap();
        let after_first = session.current().clone();
        session.play(&bridge, "d2d4".parse().unwrap()).await.unwrap();
        assert_eq!(session.moves_played(), 2);

        assert!(session.undo());
        assert_eq!(session.current(), &after_first);
        assert!(session.undo());
        assert_eq!(session.current(), &Position::starting());
        assert!(!session.undo());
        assert_eq!(session.current(), &Position::starting());

        session.play(&bridge, "e2e4".parse().unwrap()).await.unwrap();
        session.reset(Position::empty());
        assert_eq!(session.moves_played(), 0);
        assert!(!session.undo());
        assert_eq!(session.current(), &Position::empty());
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_illegal_move_keeps_history() {
        let bridge = fake_bridge().await;
        let mut session = Session::new(Position::starting());

        let result = session.play(&bridge, "a2a3".parse().unwrap()).await;
        assert!(matches!(result, Err(SessionError::Apply(_))));
        assert_eq!(session.moves_played(), 0);

        session.play(&bridge, "e2e4".parse().unwrap()).await.unwrap();
        // Still listed by the engine, but e2 is empty now.
        let result = session.play(&bridge, "e2e4".parse().unwrap()).await;
        assert!(matches!(result, Err(SessionError::Apply(_))));
        assert_eq!(session.moves_played(), 1);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_execute_commands() {
        let bridge = fake_bridge().await;
        let mut session = Session::new(Position::starting());

        assert_eq!(
            session.execute(&bridge, ReplCommand::Moves).await.unwrap(),
            Outcome::Print("e2e4 d2d4".to_string())
        );
        assert_eq!(
            session.execute(&bridge, ReplCommand::Fen(None)).await.unwrap(),
            Outcome::Print(chess::STARTING_FEN.to_string())
        );
        assert_eq!(
            session.execute(&bridge, ReplCommand::Undo).await.unwrap(),
            Outcome::Print("Nothing to undo".to_string())
        );
        assert_eq!(
            session.execute(&bridge, ReplCommand::Quit).await.unwrap(),
            Outcome::Quit
        );

        let loaded = session
            .execute(&bridge, ReplCommand::Fen(Some("8/8/8/8/8/8/8/K6k b - - 3 40".into())))
            .await
            .unwrap();
        assert!(matches!(loaded, Outcome::Print(text) if text.ends_with("black to move, castling -, en passant -")));
        assert!(matches!(
            session.execute(&bridge, ReplCommand::Fen(Some("bogus".into()))).await,
            Err(SessionError::Fen(_))
        ));
        bridge.shutdown().await;
    }
}
