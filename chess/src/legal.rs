//! Legal move generation and game status

use crate::attack;
use crate::movegen::{MaybeMovePush, MoveGenImpl, MoveList, MovePush};
use crate::moves::{self, Move};
use crate::position::Position;
use chessrules_base::Square;

use tracing::{trace, warn};

/// Status of the position from the point of view of the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The side to move is not in check and has legal moves
    Ongoing,
    /// The side to move is in check, but has legal moves
    Check,
    /// The side to move is in check and has no legal moves
    Checkmate,
    /// The side to move is not in check and has no legal moves
    Stalemate,
}

impl GameStatus {
    /// Returns `true` if no moves can be made from the position
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

/// Tells whether pseudo-legal moves leave the king of the moving side under attack
///
/// Each move is applied to a scratch copy of the position, and the king square is checked
/// against the recomputed attacks of the opponent.
#[derive(Clone, Debug)]
pub struct Checker<'a> {
    src: &'a Position,
}

impl<'a> Checker<'a> {
    pub fn new(src: &'a Position) -> Self {
        Self { src }
    }

    /// Returns `true` if the pseudo-legal move `mv` is legal
    ///
    /// Moves which cannot be applied at all are not legal.
    pub fn is_legal(&self, mv: &Move) -> bool {
        let side = self.src.side();
        match moves::make_move(self.src, mv) {
            Ok(next) => !attack::is_square_attacked(&next, next.king_square(side), side.inv()),
            Err(e) => {
                warn!(mv = %mv, error = %e, "cannot apply generated move");
                false
            }
        }
    }
}

struct LegalFilter<'a, P> {
    checker: Checker<'a>,
    inner: &'a mut P,
    seen: usize,
    passed: usize,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    fn new(src: &'a Position, inner: &'a mut P) -> Self {
        Self {
            checker: Checker::new(src),
            inner,
            seen: 0,
            passed: 0,
        }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        self.seen += 1;
        if !self.checker.is_legal(&mv) {
            return Ok(());
        }
        self.passed += 1;
        self.inner.push(mv)
    }
}

impl<'a, P> Drop for LegalFilter<'a, P> {
    fn drop(&mut self) {
        trace!(candidates = self.seen, legal = self.passed, "legality filter");
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Generates all the legal moves into `dst`
pub fn gen_all_into<P: MovePush>(p: &Position, dst: &mut P) {
    let mut filter = LegalFilter::new(p, dst);
    let _ = MoveGenImpl::new(p, &mut filter).gen_all();
}

/// Generates all the legal moves
pub fn gen_all(p: &Position) -> MoveList {
    let mut res = MoveList::new();
    gen_all_into(p, &mut res);
    res
}

/// Generates the legal moves of the piece on square `sq` into `dst`
pub fn gen_piece_into<P: MovePush>(p: &Position, sq: Square, dst: &mut P) {
    let mut filter = LegalFilter::new(p, dst);
    let _ = MoveGenImpl::new(p, &mut filter).gen_piece(sq);
}

/// Generates the legal moves of the piece on square `sq`
///
/// The list is empty if the square is empty or holds a piece of the side not to move.
pub fn gen_piece(p: &Position, sq: Square) -> MoveList {
    let mut res = MoveList::new();
    gen_piece_into(p, sq, &mut res);
    res
}

/// Returns `true` if the side to move has at least one legal move
///
/// Stops at the first legal move found.
pub fn has_legal_moves(p: &Position) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut filter = LegalFilter::new(p, &mut err_on_first);
    MoveGenImpl::new(p, &mut filter).gen_all().is_err()
}

/// Classifies the position
pub fn game_status(p: &Position) -> GameStatus {
    match (p.is_check(), has_legal_moves(p)) {
        (true, true) => GameStatus::Check,
        (true, false) => GameStatus::Checkmate,
        (false, true) => GameStatus::Ongoing,
        (false, false) => GameStatus::Stalemate,
    }
}
