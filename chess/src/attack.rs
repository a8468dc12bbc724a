//! Attack maps

use crate::position::{Piece, Position};
use chessrules_base::geometry::{DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS};
use chessrules_base::{Color, PieceKind, Square, SquareSet};

/// Set of squares attacked by one side
///
/// The map is computed from a position snapshot and never updated, so it must be recomputed
/// after each move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttackMap {
    pub side: Color,
    pub squares: SquareSet,
}

impl AttackMap {
    #[inline]
    pub fn has(&self, sq: Square) -> bool {
        self.squares.has(sq)
    }
}

fn offsets(src: Square, table: &[(i8, i8)]) -> SquareSet {
    table
        .iter()
        .filter_map(|&(df, dr)| src.try_shift(df, dr))
        .collect()
}

/// Squares attacked by a king standing on `src`
#[inline]
pub fn king(src: Square) -> SquareSet {
    offsets(src, &KING_OFFSETS)
}

/// Squares attacked by a knight standing on `src`
#[inline]
pub fn knight(src: Square) -> SquareSet {
    offsets(src, &KNIGHT_OFFSETS)
}

/// Squares attacked by a pawn of color `c` standing on `src`
///
/// Both forward diagonals are attacked, regardless of whether they are occupied.
#[inline]
pub fn pawn(c: Color, src: Square) -> SquareSet {
    offsets(src, &[(-1, c.forward()), (1, c.forward())])
}

/// Squares attacked along the rays from `directions`
///
/// Each ray includes the first occupied square and stops there.
pub fn rays(p: &Position, src: Square, directions: &[(i8, i8)]) -> SquareSet {
    let mut res = SquareSet::EMPTY;
    for &(df, dr) in directions {
        let mut cur = src;
        while let Some(next) = cur.try_shift(df, dr) {
            res.set(next);
            if p.get(next).is_some() {
                break;
            }
            cur = next;
        }
    }
    res
}

/// Squares attacked by `piece` in position `p`
pub fn piece_attacks(p: &Position, piece: &Piece) -> SquareSet {
    let src = piece.square();
    match piece.kind() {
        PieceKind::Pawn => pawn(piece.color(), src),
        PieceKind::Knight => knight(src),
        PieceKind::Bishop => rays(p, src, &DIAGONALS),
        PieceKind::Rook => rays(p, src, &ORTHOGONALS),
        PieceKind::Queen => rays(p, src, &DIAGONALS) | rays(p, src, &ORTHOGONALS),
        PieceKind::King => king(src),
    }
}

/// Computes the attack map of side `c` in position `p`
pub fn attacks(p: &Position, c: Color) -> AttackMap {
    let squares = p
        .pieces_of(c)
        .fold(SquareSet::EMPTY, |acc, piece| acc | piece_attacks(p, &piece));
    AttackMap { side: c, squares }
}

/// Returns `true` if square `sq` is attacked by any piece of color `by`
pub fn is_square_attacked(p: &Position, sq: Square, by: Color) -> bool {
    p.pieces_of(by)
        .any(|piece| piece_attacks(p, &piece).has(sq))
}
