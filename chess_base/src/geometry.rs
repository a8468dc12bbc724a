use crate::types::{CastlingSide, Color, File, Rank, Square};

pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

pub const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const fn back_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

pub const fn pawn_home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn promote_rank(c: Color) -> Rank {
    back_rank(c.inv())
}

/// Rank on which a pawn of color `c` lands after a two-square advance
pub const fn double_step_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}

pub const fn king_home(c: Color) -> Square {
    Square::from_parts(File::E, back_rank(c))
}

pub const fn rook_home(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    };
    Square::from_parts(file, back_rank(c))
}

pub const fn castling_king_dst(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Square::from_parts(file, back_rank(c))
}

pub const fn castling_rook_dst(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Square::from_parts(file, back_rank(c))
}

/// Files strictly between the king and the rook, which must all be empty and unattacked to castle
///
/// The king's destination is always among them.
pub const fn castling_gap(s: CastlingSide) -> &'static [File] {
    match s {
        CastlingSide::King => &[File::F, File::G],
        CastlingSide::Queen => &[File::B, File::C, File::D],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_squares() {
        assert_eq!(king_home(Color::Black).to_string(), "e8");
        assert_eq!(rook_home(Color::White, CastlingSide::Queen).to_string(), "a1");
        assert_eq!(castling_king_dst(Color::White, CastlingSide::King).to_string(), "g1");
        assert_eq!(castling_rook_dst(Color::Black, CastlingSide::Queen).to_string(), "d8");
        for c in [Color::White, Color::Black] {
            for side in CastlingSide::ALL {
                let dst = castling_king_dst(c, side);
                assert!(castling_gap(side).contains(&dst.file()));
                assert!(castling_gap(side).contains(&castling_rook_dst(c, side).file()));
            }
        }
    }

    #[test]
    fn test_pawn_ranks() {
        assert_eq!(promote_rank(Color::White), Rank::R8);
        assert_eq!(promote_rank(Color::Black), Rank::R1);
        for c in [Color::White, Color::Black] {
            let home = pawn_home_rank(c).index() as i8;
            assert_eq!(home + 2 * c.forward(), double_step_rank(c).index() as i8);
        }
    }
}
