use crate::attack;
use crate::moves::Move;
use crate::position::{Piece, Position};
use chessrules_base::geometry::{self, DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS};
use chessrules_base::{CastlingSide, PieceKind, Square};

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// Maximum number of moves in a list
///
/// No legal chess position has more moves.
pub const MAX_MOVES: usize = 256;

pub(crate) trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, MAX_MOVES>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

pub(crate) struct MoveGenImpl<'a, P> {
    pos: &'a Position,
    dst: &'a mut P,
}

impl<'a, P: MaybeMovePush> MoveGenImpl<'a, P> {
    pub fn new(pos: &'a Position, dst: &'a mut P) -> Self {
        MoveGenImpl { pos, dst }
    }

    fn add_to(&mut self, piece: Piece, dst: Square) -> Result<(), P::Err> {
        match self.pos.get(dst) {
            None => self.dst.push(Move::quiet(piece, dst)),
            Some(victim) if victim.color() != piece.color() => {
                self.dst.push(Move::capture(piece, victim))
            }
            Some(_) => Ok(()),
        }
    }

    fn gen_offsets(&mut self, piece: Piece, table: &[(i8, i8)]) -> Result<(), P::Err> {
        for &(df, dr) in table {
            if let Some(dst) = piece.square().try_shift(df, dr) {
                self.add_to(piece, dst)?;
            }
        }
        Ok(())
    }

    fn gen_rays(&mut self, piece: Piece, directions: &[(i8, i8)]) -> Result<(), P::Err> {
        for &(df, dr) in directions {
            let mut cur = piece.square();
            while let Some(dst) = cur.try_shift(df, dr) {
                self.add_to(piece, dst)?;
                if self.pos.get(dst).is_some() {
                    break;
                }
                cur = dst;
            }
        }
        Ok(())
    }

    fn add_pawn_move(&mut self, pawn: Piece, dst: Square, victim: Option<Piece>) -> Result<(), P::Err> {
        if dst.rank() == geometry::promote_rank(pawn.color()) {
            for to in PieceKind::PROMOTIONS {
                self.dst.push(Move::promotion(pawn, dst, to, victim))?;
            }
            return Ok(());
        }
        match victim {
            Some(victim) => self.dst.push(Move::capture(pawn, victim)),
            None => self.dst.push(Move::quiet(pawn, dst)),
        }
    }

    fn gen_pawn(&mut self, pawn: Piece) -> Result<(), P::Err> {
        let c = pawn.color();
        let src = pawn.square();
        let fwd = c.forward();

        // Advances
        if let Some(one) = src.try_shift(0, fwd) {
            if self.pos.get(one).is_none() {
                self.add_pawn_move(pawn, one, None)?;
                if src.rank() == geometry::pawn_home_rank(c) && pawn.has_never_moved() {
                    if let Some(two) = src.try_shift(0, 2 * fwd) {
                        if self.pos.get(two).is_none() {
                            self.dst.push(Move::quiet(pawn, two))?;
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(dst) = src.try_shift(df, fwd) else {
                continue;
            };

            // Captures
            if let Some(victim) = self.pos.get(dst) {
                if victim.color() != c {
                    self.add_pawn_move(pawn, dst, Some(victim))?;
                }
                continue;
            }

            // En passant
            let Some(beside) = src.try_shift(df, 0) else {
                continue;
            };
            if self.pos.ep_source() != Some(beside) {
                continue;
            }
            if let Some(victim) = self.pos.get(beside) {
                if victim.kind() == PieceKind::Pawn
                    && victim.color() != c
                    && victim.moved_on(self.pos.ply())
                {
                    self.dst.push(Move::enpassant(pawn, dst, victim))?;
                }
            }
        }
        Ok(())
    }

    fn can_castle(&self, king: Piece, side: CastlingSide) -> Option<Piece> {
        let c = king.color();
        let rook = self.pos.get(geometry::rook_home(c, side))?;
        if rook.kind() != PieceKind::Rook || rook.color() != c || !rook.has_never_moved() {
            return None;
        }
        let rank = geometry::back_rank(c);
        let blocked = geometry::castling_gap(side)
            .iter()
            .any(|&file| self.pos.get(Square::from_parts(file, rank)).is_some());
        (!blocked).then_some(rook)
    }

    fn gen_castling(&mut self, king: Piece) -> Result<(), P::Err> {
        let c = king.color();
        if !king.has_never_moved() || king.square() != geometry::king_home(c) {
            return Ok(());
        }
        let candidates: ArrayVec<(CastlingSide, Piece), 2> = CastlingSide::ALL
            .into_iter()
            .filter_map(|side| self.can_castle(king, side).map(|rook| (side, rook)))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let attacked = attack::attacks(self.pos, c.inv());
        if attacked.has(king.square()) {
            return Ok(());
        }
        let rank = geometry::back_rank(c);
        for (side, rook) in candidates {
            let safe = geometry::castling_gap(side)
                .iter()
                .all(|&file| !attacked.has(Square::from_parts(file, rank)));
            if safe {
                self.dst.push(Move::castling(king, rook, side))?;
            }
        }
        Ok(())
    }

    pub fn gen_for(&mut self, piece: Piece) -> Result<(), P::Err> {
        match piece.kind() {
            PieceKind::Pawn => self.gen_pawn(piece),
            PieceKind::Knight => self.gen_offsets(piece, &KNIGHT_OFFSETS),
            PieceKind::Bishop => self.gen_rays(piece, &DIAGONALS),
            PieceKind::Rook => self.gen_rays(piece, &ORTHOGONALS),
            PieceKind::Queen => {
                self.gen_rays(piece, &DIAGONALS)?;
                self.gen_rays(piece, &ORTHOGONALS)
            }
            PieceKind::King => {
                self.gen_offsets(piece, &KING_OFFSETS)?;
                self.gen_castling(piece)
            }
        }
    }

    pub fn gen_piece(&mut self, sq: Square) -> Result<(), P::Err> {
        match self.pos.get(sq) {
            Some(piece) if piece.color() == self.pos.side() => self.gen_for(piece),
            _ => Ok(()),
        }
    }

    pub fn gen_all(&mut self) -> Result<(), P::Err> {
        let pos = self.pos;
        for piece in pos.pieces_of(pos.side()) {
            self.gen_for(piece)?;
        }
        Ok(())
    }
}

/// Pseudo-legal move generation
///
/// The generated moves obey the movement rules of the pieces, but may leave the king of the
/// moving side under attack.
pub mod semilegal {
    use super::{MoveGenImpl, MoveList, MovePush};
    use crate::position::Position;
    use chessrules_base::Square;

    /// Generates the moves of all the pieces of the side to move into `dst`
    pub fn gen_all_into<P: MovePush>(p: &Position, dst: &mut P) {
        let _ = MoveGenImpl::new(p, dst).gen_all();
    }

    /// Generates the moves of all the pieces of the side to move
    pub fn gen_all(p: &Position) -> MoveList {
        let mut res = MoveList::new();
        gen_all_into(p, &mut res);
        res
    }

    /// Generates the moves of the piece on square `sq` into `dst`
    ///
    /// Nothing is generated if the square is empty or holds a piece of the side not to move.
    pub fn gen_piece_into<P: MovePush>(p: &Position, sq: Square, dst: &mut P) {
        let _ = MoveGenImpl::new(p, dst).gen_piece(sq);
    }

    /// Generates the moves of the piece on square `sq`
    pub fn gen_piece(p: &Position, sq: Square) -> MoveList {
        let mut res = MoveList::new();
        gen_piece_into(p, sq, &mut res);
        res
    }
}
