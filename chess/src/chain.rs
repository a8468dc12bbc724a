use crate::legal::{self, GameStatus};
use crate::moves::{self, MalformedMove, Move, MoveError, NotationError};
use crate::position::Position;

use std::fmt;
use std::ops::Deref;
use std::slice;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse move #{}: {}", .pos + 1, .source)]
pub struct NotationListError {
    pub pos: usize,
    pub source: NotationError,
}

/// Append-only sequence of the moves made in a game
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveHistory(Vec<Move>);

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, mv: Move) {
        self.0.push(mv);
    }
}

impl Deref for MoveHistory {
    type Target = [Move];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a MoveHistory {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Chess game: the starting position, the moves made from it and the resulting position
///
/// Only legal moves are accepted, so the current position is always reachable from the starting
/// one under the rules of chess.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    start: Position,
    position: Position,
    history: MoveHistory,
}

impl Game {
    pub fn new(p: Position) -> Self {
        Game {
            start: p.clone(),
            position: p,
            history: MoveHistory::new(),
        }
    }

    pub fn new_initial() -> Self {
        Self::new(Position::initial())
    }

    /// Creates a game from position `p` and the moves listed in `list`
    ///
    /// See [`Game::push_notation_list()`] for the format of `list`.
    pub fn from_notation_list(p: Position, list: &str) -> Result<Self, NotationListError> {
        let mut res = Game::new(p);
        res.push_notation_list(list)?;
        Ok(res)
    }

    /// Returns the position the game started from
    pub fn start(&self) -> &Position {
        &self.start
    }

    /// Returns the current position
    pub fn last(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.history.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Move> {
        self.history.get(idx)
    }

    /// Classifies the current position
    pub fn status(&self) -> GameStatus {
        legal::game_status(&self.position)
    }

    /// Returns all the legal moves in the current position
    pub fn legal_moves(&self) -> crate::MoveList {
        legal::gen_all(&self.position)
    }

    fn do_push(&mut self, mv: Move) -> Result<(), MalformedMove> {
        self.position = moves::make_move(&self.position, &mv)?;
        debug!(ply = self.position.ply(), mv = %mv, "move made");
        self.history.push(mv);
        Ok(())
    }

    /// Makes the move `mv`
    ///
    /// The move must be legal in the current position, otherwise [`MoveError::IllegalMove`] is
    /// returned and the game is not changed.
    pub fn push(&mut self, mv: Move) -> Result<(), MoveError> {
        if !legal::gen_all(&self.position).contains(&mv) {
            warn!(ply = self.position.ply(), mv = %mv, "illegal move rejected");
            return Err(MoveError::IllegalMove(mv.to_string()));
        }
        Ok(self.do_push(mv)?)
    }

    /// Parses the move from its notation and makes it
    pub fn push_notation(&mut self, s: &str) -> Result<(), NotationError> {
        let mv = Move::from_notation(s, &self.position)?;
        Ok(self.do_push(mv)?)
    }

    /// Makes the moves listed in `list`, separated by `;`
    ///
    /// Empty items are skipped. On error, the moves preceding the erroneous one stay made.
    pub fn push_notation_list(&mut self, list: &str) -> Result<(), NotationListError> {
        let items = list.split(';').filter(|s| !s.trim().is_empty());
        for (pos, token) in items.enumerate() {
            self.push_notation(token)
                .map_err(|source| NotationListError { pos, source })?;
        }
        Ok(())
    }

    /// Returns a wrapper which formats the moves in the form accepted by
    /// [`Game::push_notation_list()`]
    pub fn notation_list(&self) -> NotationList<'_> {
        NotationList(self)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new_initial()
    }
}

pub struct NotationList<'a>(&'a Game);

impl<'a> fmt::Display for NotationList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, m) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessrules_base::Color;

    #[test]
    fn test_push() {
        let mut game = Game::new_initial();
        game.push_notation("e2->e4").unwrap();
        game.push_notation("e7->e5").unwrap();
        game.push_notation("Ng1->f3").unwrap();
        assert_eq!(game.len(), 3);
        assert_eq!(game.last().side(), Color::Black);
        assert_eq!(game.last().ply(), 3);
        assert_eq!(game.start(), &Position::initial());
        assert_eq!(game.notation_list().to_string(), "e2->e4; e7->e5; Ng1->f3");

        let illegal = Move::from_notation("e2->e4", &Position::initial()).unwrap();
        assert_eq!(
            game.push(illegal),
            Err(MoveError::IllegalMove("e2->e4".to_string()))
        );
        assert_eq!(game.len(), 3);
    }

    #[test]
    fn test_notation_list() {
        let list = "f2->f3; e7->e5; g2->g4; Qd8->h4";
        let game = Game::from_notation_list(Position::initial(), list).unwrap();
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.notation_list().to_string(), list);

        let res = Game::from_notation_list(Position::initial(), "e2->e4; e2->e4");
        assert_eq!(
            res,
            Err(NotationListError {
                pos: 1,
                source: NotationError::NoSuchMove("e2->e4".to_string())
            })
        );
    }

    #[test]
    fn test_castling_through_history() {
        let list = "e2->e4; e7->e5; Ng1->f3; Nb8->c6; Bf1->c4; Ng8->f6; Ke1->g1, Rh1->f1";
        let game = Game::from_notation_list(Position::initial(), list).unwrap();
        assert_eq!(game.len(), 7);
        assert_eq!(
            game.last().as_diagram(),
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1"
        );
    }
}
