//! A single chess game driven by algebraic notation.

use knightwire_core::error::RelayError;
use knightwire_core::rules::Game;
use shakmaty::san::SanPlus;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, Color, EnPassantMode, Outcome, Position};
use tracing::debug;

use super::board::render_board;

/// Half-moves without a capture or pawn move that end the game (75 moves).
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position that end the game.
const FIVEFOLD: usize = 5;

/// A chess game in progress or finished.
///
/// Besides checkmate, stalemate and insufficient material, the game ends in
/// a draw under the seventy-five-move rule and on fivefold repetition. Once
/// finished, every further move is rejected.
#[derive(Debug, Clone)]
pub struct ChessGame {
    position: Chess,
    plies: u32,
    /// Position keys since the last irreversible move, current one included.
    history: Vec<Zobrist64>,
}

impl ChessGame {
    /// Creates a game in the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    /// Creates a game continuing from `position`.
    #[must_use]
    pub fn from_position(position: Chess) -> Self {
        let history = vec![position_key(&position)];
        Self {
            position,
            plies: 0,
            history,
        }
    }

    /// Number of half-moves played so far.
    #[must_use]
    pub fn plies(&self) -> u32 {
        self.plies
    }

    fn result(&self) -> Option<Outcome> {
        self.position.outcome().or_else(|| {
            let exhausted = self.position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES;
            (exhausted || self.repetitions() >= FIVEFOLD).then_some(Outcome::Draw)
        })
    }

    fn repetitions(&self) -> usize {
        let Some(current) = self.history.last() else {
            return 0;
        };
        self.history.iter().filter(|key| *key == current).count()
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

fn position_key(position: &Chess) -> Zobrist64 {
    position.zobrist_hash(EnPassantMode::Legal)
}

impl Game for ChessGame {
    fn play(&mut self, notation: &str) -> Result<(), RelayError> {
        let illegal = |reason: String| RelayError::IllegalMove {
            notation: notation.to_owned(),
            reason,
        };

        if self.result().is_some() {
            return Err(illegal("game is over".to_owned()));
        }

        let san: SanPlus = notation.trim().parse().map_err(|e| illegal(format!("{e}")))?;
        let m = san
            .san
            .to_move(&self.position)
            .map_err(|e| illegal(format!("{e}")))?;

        self.position.play_unchecked(&m);
        self.plies += 1;
        if self.position.halfmoves() == 0 {
            // Positions before a capture or pawn move cannot recur.
            self.history.clear();
        }
        self.history.push(position_key(&self.position));
        debug!(plies = self.plies, notation, "move applied");
        Ok(())
    }

    fn render(&self) -> String {
        render_board(self.position.board())
    }

    fn outcome(&self) -> Result<Option<String>, RelayError> {
        Ok(self.result().map(|o| outcome_label(o).to_owned()))
    }
}

/// Result string for a finished game.
#[must_use]
pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Decisive {
            winner: Color::White,
        } => "1-0",
        Outcome::Decisive {
            winner: Color::Black,
        } => "0-1",
        Outcome::Draw => "1/2-1/2",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shakmaty::CastlingMode;
    use shakmaty::fen::Fen;

    const FOOLS_MATE: [&str; 4] = ["f3", "e5", "g4", "Qh4#"];
    const SCHOLARS_MATE: [&str; 7] = ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"];

    fn game_from_fen(fen: &str) -> ChessGame {
        let fen: Fen = fen.parse().unwrap();
        ChessGame::from_position(fen.into_position(CastlingMode::Standard).unwrap())
    }

    fn play_all(game: &mut ChessGame, moves: &[&str]) {
        for notation in moves {
            game.play(notation).unwrap();
        }
    }

    #[test]
    fn test_new_game_renders_starting_position() {
        let game = ChessGame::new();

        assert_eq!(game.render(), render_board(Chess::default().board()));
        assert_eq!(game.plies(), 0);
    }

    #[test]
    fn test_legal_move_advances_position() {
        let mut game = ChessGame::new();
        let before = game.render();

        game.play("e4").unwrap();

        assert_ne!(game.render(), before);
        assert_eq!(game.plies(), 1);
        assert!(game.render().contains("4- - - - ♙ - - - "));
    }

    #[test]
    fn test_rendering_matches_independent_replay() {
        let moves = ["d4", "Nf6", "c4", "e6", "Nc3", "Bb4", "Qc2", "O-O"];
        let mut game = ChessGame::new();
        let mut reference = Chess::default();

        for notation in moves {
            game.play(notation).unwrap();
            let san: SanPlus = notation.parse().unwrap();
            let m = san.san.to_move(&reference).unwrap();
            reference.play_unchecked(&m);

            assert_eq!(game.render(), render_board(reference.board()));
        }
    }

    #[test]
    fn test_unparseable_notation_is_illegal_and_leaves_position() {
        let mut game = ChessGame::new();
        let before = game.render();

        let result = game.play("e9");

        match result.unwrap_err() {
            RelayError::IllegalMove { notation, .. } => assert_eq!(notation, "e9"),
            other => panic!("expected IllegalMove, got {other:?}"),
        }
        assert_eq!(game.render(), before);
        assert_eq!(game.plies(), 0);
    }

    #[test]
    fn test_wrong_side_move_is_illegal() {
        let mut game = ChessGame::new();

        assert!(game.play("e5").is_err());
        assert_eq!(game.plies(), 0);
    }

    #[test]
    fn test_valid_move_after_illegal_applies_to_prior_position() {
        let mut game = ChessGame::new();
        let mut reference = ChessGame::new();

        assert!(game.play("e9").is_err());
        game.play("e4").unwrap();
        reference.play("e4").unwrap();

        assert_eq!(game.render(), reference.render());
    }

    #[test]
    fn test_ongoing_game_has_no_outcome() {
        let mut game = ChessGame::new();
        game.play("e4").unwrap();

        assert_eq!(game.outcome().unwrap(), None);
    }

    #[test]
    fn test_fools_mate_reports_black_win() {
        let mut game = ChessGame::new();

        play_all(&mut game, &FOOLS_MATE);

        assert_eq!(game.outcome().unwrap().as_deref(), Some("0-1"));
    }

    #[test]
    fn test_scholars_mate_reports_white_win() {
        let mut game = ChessGame::new();

        play_all(&mut game, &SCHOLARS_MATE);

        assert_eq!(game.outcome().unwrap().as_deref(), Some("1-0"));
    }

    #[test]
    fn test_no_move_is_accepted_after_checkmate() {
        let mut game = ChessGame::new();
        play_all(&mut game, &FOOLS_MATE);
        let final_render = game.render();

        for notation in ["Kf2", "a3", "Nc3", "e4"] {
            assert!(game.play(notation).is_err());
        }

        assert_eq!(game.render(), final_render);
        assert_eq!(game.plies(), 4);
    }

    #[test]
    fn test_insufficient_material_draw_rejects_further_moves() {
        // Arrange: the white king can take the last black piece.
        let mut game = game_from_fen("8/8/8/4k3/8/8/3q4/4K3 w - - 0 1");

        // Act
        game.play("Kxd2").unwrap();
        let final_render = game.render();
        let after_draw = game.play("Kd5");

        // Assert
        assert_eq!(game.outcome().unwrap().as_deref(), Some("1/2-1/2"));
        match after_draw.unwrap_err() {
            RelayError::IllegalMove { reason, .. } => assert_eq!(reason, "game is over"),
            other => panic!("expected IllegalMove, got {other:?}"),
        }
        assert_eq!(game.render(), final_render);
        assert_eq!(game.plies(), 1);
    }

    #[test]
    fn test_seventy_five_move_rule_ends_game() {
        // Arrange: one quiet move short of 150 half-moves.
        let mut game = game_from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 149 80");
        assert_eq!(game.outcome().unwrap(), None);

        // Act
        game.play("Ra2").unwrap();

        // Assert
        assert_eq!(game.outcome().unwrap().as_deref(), Some("1/2-1/2"));
        assert!(game.play("Kd5").is_err());
    }

    #[test]
    fn test_capture_resets_seventy_five_move_count() {
        let mut game = game_from_fen("8/8/8/4k3/8/8/3q4/R3K3 w - - 149 80");

        game.play("Kxd2").unwrap();

        assert_eq!(game.outcome().unwrap(), None);
    }

    #[test]
    fn test_fivefold_repetition_ends_game() {
        // Arrange
        let mut game = ChessGame::new();
        let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];

        // Act: the starting position recurs after every shuffle.
        for _ in 0..3 {
            play_all(&mut game, &shuffle);
        }
        let after_fourth_occurrence = game.outcome().unwrap();
        play_all(&mut game, &shuffle);

        // Assert
        assert_eq!(after_fourth_occurrence, None);
        assert_eq!(game.outcome().unwrap().as_deref(), Some("1/2-1/2"));
        assert!(game.play("e4").is_err());
    }

    #[test]
    fn test_outcome_label_draw() {
        assert_eq!(outcome_label(Outcome::Draw), "1/2-1/2");
    }
}
