//! # Chess rules engine
//!
//! This crate knows the rules of chess: it enumerates the legal moves in a position, applies a
//! chosen move to produce the next position, and tells check, checkmate and stalemate apart. It
//! doesn't search or evaluate positions.
//!
//! Moves are represented as lists of piece relocations (see [`Move`]), so castling, en passant and
//! promotion need no special treatment when a move is applied.
//!
//! # Example
//!
//! ```
//! use chessrules::{Game, GameStatus};
//!
//! let mut game = Game::new_initial();
//! game.push_notation_list("f2->f3; e7->e5; g2->g4").unwrap();
//! assert_eq!(game.legal_moves().len(), 30);
//!
//! game.push_notation("Qd8->h4").unwrap();
//! assert_eq!(game.status(), GameStatus::Checkmate);
//! ```

pub mod attack;
pub mod chain;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod position;

pub use chessrules_base::geometry;
pub use chessrules_base::{
    CastlingSide, Color, File, OutOfBounds, PieceKind, Rank, Square,
    SquareParseError, SquareSet,
};

pub use attack::AttackMap;
pub use chain::{Game, MoveHistory};
pub use legal::GameStatus;
pub use movegen::{MoveList, MovePush};
pub use moves::{Location, Make, Move, MoveError, MoveKind, Step};
pub use position::{Piece, Ply, Position, RawPosition};

/// Returns the standard initial position
#[inline]
pub fn initial_position() -> Position {
    Position::initial()
}

/// Returns all the legal moves in position `p`
#[inline]
pub fn legal_moves(p: &Position) -> MoveList {
    legal::gen_all(p)
}

/// Applies the move `mv` to position `p`, returning the new position
///
/// The move is not checked for legality. Use [`Game::push()`] or [`Make::make()`] to accept only
/// legal moves.
#[inline]
pub fn apply(p: &Position, mv: &Move) -> Result<Position, MoveError> {
    Ok(moves::make_move(p, mv)?)
}

/// Classifies position `p` as ongoing, check, checkmate or stalemate
#[inline]
pub fn game_status(p: &Position) -> GameStatus {
    legal::game_status(p)
}

/// Returns the textual form of the move `mv`
#[inline]
pub fn notation(mv: &Move) -> String {
    mv.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn check_invariants(p: &Position) {
        let legal = legal_moves(p);
        let semi = movegen::semilegal::gen_all(p);
        let side = p.side();
        assert_eq!(legal, legal_moves(p));
        for mv in &legal {
            assert!(semi.contains(mv), "{} is not pseudo-legal", mv);
            let next = apply(p, mv).unwrap();
            assert!(
                !attack::is_square_attacked(&next, next.king_square(side), side.inv()),
                "{} leaves the king attacked",
                mv
            );
            assert_eq!(Move::from_notation(&notation(mv), p).as_ref(), Ok(mv));
            assert_eq!(next.ply(), p.ply() + 1);
            assert_eq!(next.side(), side.inv());
            assert!(Position::try_from(*next.raw()).is_ok());
        }
        let status = game_status(p);
        assert_eq!(status.is_finished(), legal.is_empty());
        assert_eq!(
            matches!(status, GameStatus::Check | GameStatus::Checkmate),
            p.is_check()
        );
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..4 {
            let mut game = Game::new_initial();
            for _ in 0..60 {
                check_invariants(game.last());
                let moves = game.legal_moves();
                let Some(mv) = moves.choose(&mut rng) else {
                    break;
                };
                game.push(mv.clone()).unwrap();
            }
            let replayed =
                Game::from_notation_list(Position::initial(), &game.notation_list().to_string())
                    .unwrap();
            assert_eq!(replayed, game);
        }
    }

    #[test]
    fn test_top_level() {
        let p = initial_position();
        assert_eq!(legal_moves(&p).len(), 20);
        assert_eq!(game_status(&p), GameStatus::Ongoing);
        let mv = Move::from_notation("Nb1->c3", &p).unwrap();
        assert_eq!(notation(&mv), "Nb1->c3");
        let q = apply(&p, &mv).unwrap();
        assert_eq!(
            apply(&q, &mv),
            Err(MoveError::MalformedMove(moves::MalformedMove::MissingPiece(
                "b1".parse().unwrap()
            )))
        );
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Position>();
        assert_send_sync::<Move>();
        assert_send_sync::<Game>();
    }
}
