use super::base::{self, MalformedMove, Move, MoveError, MoveKind};
use super::notation::NotationError;
use crate::legal;
use crate::position::Position;
use chessrules_base::{PieceKind, Square};

impl Move {
    /// Finds the legal move of the piece at coordinates `src` to coordinates `dst`
    ///
    /// Coordinates are zero-based `(file, rank)` pairs. For promotions, `promote` selects the new
    /// piece and defaults to a queen. Castling is selected by the king's coordinates.
    pub fn from_coords(
        p: &Position,
        src: (i8, i8),
        dst: (i8, i8),
        promote: Option<PieceKind>,
    ) -> Result<Move, MoveError> {
        let src = Square::try_from_coords(src.0, src.1)?;
        let dst = Square::try_from_coords(dst.0, dst.1)?;
        let promote = promote.unwrap_or(PieceKind::Queen);
        legal::gen_piece(p, src)
            .into_iter()
            .find(|mv| {
                mv.dst() == Some(dst)
                    && match mv.kind() {
                        MoveKind::Promotion { to, .. } => to == promote,
                        _ => true,
                    }
            })
            .ok_or_else(|| MoveError::IllegalMove(format!("{}->{}", src, dst)))
    }
}

/// Something that can be made as a move in a position
pub trait Make {
    type Err;

    /// Makes the move in `p` and returns the resulting position
    fn make(&self, p: &Position) -> Result<Position, Self::Err>;
}

/// Move which is applied without checking its legality
///
/// Only malformed moves are rejected, see [`make_move()`](super::make_move).
pub struct Unchecked<'a>(pub &'a Move);

impl<'a> Make for Unchecked<'a> {
    type Err = MalformedMove;

    #[inline]
    fn make(&self, p: &Position) -> Result<Position, Self::Err> {
        base::make_move(p, self.0)
    }
}

impl Make for Move {
    type Err = MoveError;

    fn make(&self, p: &Position) -> Result<Position, Self::Err> {
        if !legal::gen_all(p).contains(self) {
            return Err(MoveError::IllegalMove(self.to_string()));
        }
        Ok(base::make_move(p, self)?)
    }
}

impl<'a> Make for &'a Move {
    type Err = MoveError;

    #[inline]
    fn make(&self, p: &Position) -> Result<Position, Self::Err> {
        (*self).make(p)
    }
}

/// Move given in text form, see [`Move::from_notation()`]
pub struct Notation<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for Notation<S> {
    type Err = NotationError;

    fn make(&self, p: &Position) -> Result<Position, Self::Err> {
        let mv = Move::from_notation(self.0.as_ref(), p)?;
        Ok(base::make_move(p, &mv)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make() {
        let p = Position::initial();
        let q = p.make_move(Notation("e2->e4")).unwrap();
        let mv = Move::from_notation("e2->e4", &p).unwrap();
        assert_eq!(p.make_move(&mv), Ok(q.clone()));
        assert_eq!(p.make_move(Unchecked(&mv)), Ok(q.clone()));

        // The move is not legal for Black, but is still well-formed
        assert_eq!(
            q.make_move(&mv),
            Err(MoveError::IllegalMove("e2->e4".to_string()))
        );
        assert_eq!(
            q.make_move(Unchecked(&mv)),
            Err(MalformedMove::MissingPiece("e2".parse().unwrap()))
        );
        assert_eq!(
            p.make_move(Notation("e2->e5")),
            Err(NotationError::NoSuchMove("e2->e5".to_string()))
        );
    }

    #[test]
    fn test_from_coords() {
        use chessrules_base::OutOfBounds;

        let p = Position::initial();
        let mv = Move::from_coords(&p, (6, 0), (5, 2), None).unwrap();
        assert_eq!(mv.to_string(), "Ng1->f3");
        assert_eq!(
            Move::from_coords(&p, (6, 0), (6, 2), None),
            Err(MoveError::IllegalMove("g1->g3".to_string()))
        );
        assert_eq!(
            Move::from_coords(&p, (8, 0), (6, 2), None),
            Err(MoveError::OutOfBounds(OutOfBounds { file: 8, rank: 0 }))
        );

        let p = Position::from_diagram("k7/4P3/8/8/8/8/8/4K2R").unwrap();
        let mv = Move::from_coords(&p, (4, 6), (4, 7), Some(PieceKind::Knight)).unwrap();
        assert_eq!(mv.to_string(), "e7->--, N--->e8");
        let mv = Move::from_coords(&p, (4, 6), (4, 7), None).unwrap();
        assert_eq!(mv.to_string(), "e7->--, Q--->e8");
        let mv = Move::from_coords(&p, (4, 0), (6, 0), None).unwrap();
        assert_eq!(mv.to_string(), "Ke1->g1, Rh1->f1");
    }
}
