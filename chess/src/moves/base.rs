use crate::position::{Piece, Position};
use chessrules_base::{geometry, CastlingSide, Color, OutOfBounds, PieceKind, Square};

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of steps in a single move
pub const MAX_STEPS: usize = 3;

/// Place where a piece is taken from or put to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Square on the board
    Board(Square),
    /// Outside of the board
    ///
    /// Captured pieces and promoted pawns go there, pieces created by promotion come from there.
    OffBoard,
}

impl Location {
    /// Returns the square if the location is on the board
    #[inline]
    pub const fn square(&self) -> Option<Square> {
        match *self {
            Location::Board(sq) => Some(sq),
            Location::OffBoard => None,
        }
    }

    #[inline]
    pub const fn is_off_board(&self) -> bool {
        matches!(*self, Location::OffBoard)
    }
}

impl From<Square> for Location {
    #[inline]
    fn from(sq: Square) -> Location {
        Location::Board(sq)
    }
}

/// Relocation of a single piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub kind: PieceKind,
    pub color: Color,
    pub src: Location,
    pub dst: Location,
}

impl Step {
    /// Creates a step which moves `piece` from its current square to `dst`
    #[inline]
    pub fn of(piece: Piece, dst: Location) -> Step {
        Step {
            kind: piece.kind(),
            color: piece.color(),
            src: Location::Board(piece.square()),
            dst,
        }
    }

    /// Creates a step which removes `piece` from the board
    #[inline]
    pub fn remove(piece: Piece) -> Step {
        Step::of(piece, Location::OffBoard)
    }

    /// Creates a step which puts a new piece onto the board
    #[inline]
    pub fn create(kind: PieceKind, color: Color, dst: Square) -> Step {
        Step {
            kind,
            color,
            src: Location::OffBoard,
            dst: Location::Board(dst),
        }
    }
}

/// Move kind
///
/// The kind is not stored in the move, but derived from its steps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Non-capturing move, including a single pawn advance
    Quiet,
    /// Pawn advance by two squares from its home rank
    DoubleStep,
    /// Capture of the piece standing on the destination square
    Capture,
    /// Castling
    Castling(CastlingSide),
    /// En passant capture
    Enpassant,
    /// Pawn promotion, either capturing or not
    Promotion { to: PieceKind, capture: bool },
}

/// Error indicating that a move cannot be applied to a position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MalformedMove {
    /// Move has no steps
    #[error("move has no steps")]
    Empty,
    /// Move has more steps than any chess move can have
    #[error("too many steps in move: {0}")]
    TooManySteps(usize),
    /// Lists of pieces and destinations have different lengths
    #[error("{pieces} pieces, but {destinations} destinations")]
    LengthMismatch { pieces: usize, destinations: usize },
    /// There is no piece on the source square
    #[error("no piece on {0}")]
    MissingPiece(Square),
    /// The piece on the source square differs from the one named in the move
    #[error("piece on {0} doesn't match the move")]
    PieceMismatch(Square),
    /// Two pieces land on the same square
    #[error("square {0} is occupied twice")]
    SquareCollision(Square),
    /// The move takes the king off the board
    #[error("move removes the {0:?} king")]
    KingRemoved(Color),
}

/// Error returned when a move cannot be selected or committed
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    #[error("square out of bounds: {0}")]
    OutOfBounds(#[from] OutOfBounds),
    #[error("illegal move {0}")]
    IllegalMove(String),
    #[error("malformed move: {0}")]
    MalformedMove(#[from] MalformedMove),
}

/// Chess move
///
/// A move is an ordered list of one to three steps, each relocating a single piece:
///
/// - simple move: the mover goes to its destination
/// - capture: the mover goes to its destination, the victim goes off the board
/// - castling: the king goes to its destination, then the rook does
/// - en passant: the pawn goes to its destination, the victim standing beside it goes off the board
/// - promotion: the pawn goes off the board, the victim (if any) goes off the board, and the new
///   piece comes from off the board to the destination
///
/// The first step always moves a piece of the side to move from a board square.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    steps: ArrayVec<Step, MAX_STEPS>,
}

impl Move {
    /// Creates a move from its steps
    pub fn new(steps: &[Step]) -> Result<Move, MalformedMove> {
        if steps.is_empty() {
            return Err(MalformedMove::Empty);
        }
        let steps = ArrayVec::try_from(steps).map_err(|_| MalformedMove::TooManySteps(steps.len()))?;
        Ok(Move { steps })
    }

    /// Creates a move from a list of pieces and a parallel list of their destinations
    ///
    /// Each piece is given as its kind, color and current location.
    pub fn from_lists(
        pieces: &[(PieceKind, Color, Location)],
        destinations: &[Location],
    ) -> Result<Move, MalformedMove> {
        if pieces.len() != destinations.len() {
            return Err(MalformedMove::LengthMismatch {
                pieces: pieces.len(),
                destinations: destinations.len(),
            });
        }
        let steps: Vec<Step> = pieces
            .iter()
            .zip(destinations)
            .map(|(&(kind, color, src), &dst)| Step {
                kind,
                color,
                src,
                dst,
            })
            .collect();
        Move::new(&steps)
    }

    fn from_steps<const N: usize>(steps: [Step; N]) -> Move {
        Move {
            steps: steps.into_iter().collect(),
        }
    }

    /// Creates a non-capturing move of `piece` to `dst`
    #[inline]
    pub fn quiet(piece: Piece, dst: Square) -> Move {
        Move::from_steps([Step::of(piece, dst.into())])
    }

    /// Creates a move of `piece` to the square of `victim`, capturing it
    #[inline]
    pub fn capture(piece: Piece, victim: Piece) -> Move {
        Move::from_steps([Step::of(piece, victim.square().into()), Step::remove(victim)])
    }

    /// Creates a castling move
    #[inline]
    pub fn castling(king: Piece, rook: Piece, side: CastlingSide) -> Move {
        let c = king.color();
        Move::from_steps([
            Step::of(king, geometry::castling_king_dst(c, side).into()),
            Step::of(rook, geometry::castling_rook_dst(c, side).into()),
        ])
    }

    /// Creates an en passant capture of `victim` by `pawn` which goes to `dst`
    #[inline]
    pub fn enpassant(pawn: Piece, dst: Square, victim: Piece) -> Move {
        Move::from_steps([Step::of(pawn, dst.into()), Step::remove(victim)])
    }

    /// Creates a promotion of `pawn` into `to` on square `dst`
    ///
    /// If `victim` is present, it is the piece standing on `dst`.
    pub fn promotion(pawn: Piece, dst: Square, to: PieceKind, victim: Option<Piece>) -> Move {
        let create = Step::create(to, pawn.color(), dst);
        match victim {
            Some(victim) => Move::from_steps([Step::remove(pawn), Step::remove(victim), create]),
            None => Move::from_steps([Step::remove(pawn), create]),
        }
    }

    /// Returns the steps of the move
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the color of the moving side
    #[inline]
    pub fn side(&self) -> Color {
        self.steps[0].color
    }

    /// Returns the kind of the moving piece
    #[inline]
    pub fn piece(&self) -> PieceKind {
        self.steps[0].kind
    }

    /// Returns the square the moving piece leaves
    #[inline]
    pub fn src(&self) -> Option<Square> {
        self.steps[0].src.square()
    }

    /// Returns the square where the moving piece (or the promoted one) lands
    pub fn dst(&self) -> Option<Square> {
        match self.kind() {
            MoveKind::Promotion { .. } => self.steps.last().and_then(|s| s.dst.square()),
            _ => self.steps[0].dst.square(),
        }
    }

    /// Returns `true` if the move removes an opponent's piece
    #[inline]
    pub fn is_capture(&self) -> bool {
        let side = self.side();
        self.steps
            .iter()
            .any(|s| s.color != side && s.dst.is_off_board())
    }

    /// Derives the kind of the move from its steps
    pub fn kind(&self) -> MoveKind {
        let first = self.steps[0];
        if let Some(created) = self.steps.iter().find(|s| s.src.is_off_board()) {
            return MoveKind::Promotion {
                to: created.kind,
                capture: self.is_capture(),
            };
        }
        if let (PieceKind::King, Some(rook)) = (first.kind, self.steps.get(1)) {
            if rook.kind == PieceKind::Rook && rook.color == first.color && !rook.dst.is_off_board()
            {
                let side = match first.dst.square().map(|sq| sq.file().index()) {
                    Some(f) if f < 4 => CastlingSide::Queen,
                    _ => CastlingSide::King,
                };
                return MoveKind::Castling(side);
            }
        }
        if let Some(victim) = self.steps.get(1) {
            if first.kind == PieceKind::Pawn
                && victim.kind == PieceKind::Pawn
                && victim.src != first.dst
            {
                return MoveKind::Enpassant;
            }
            return MoveKind::Capture;
        }
        match (first.kind, first.src.square(), first.dst.square()) {
            (PieceKind::Pawn, Some(src), Some(dst))
                if src.rank().index().abs_diff(dst.rank().index()) == 2 =>
            {
                MoveKind::DoubleStep
            }
            _ => MoveKind::Quiet,
        }
    }
}

/// Applies the move `mv` to the position `p` and returns the resulting position
///
/// All the pieces are first lifted from their source squares, and only then put onto their
/// destinations, so the order of steps doesn't matter. Every piece put onto the board is marked as
/// moved on the new ply.
///
/// The move is **not** checked for legality, but malformed moves are rejected. The original
/// position is never modified.
pub fn make_move(p: &Position, mv: &Move) -> Result<Position, MalformedMove> {
    if mv.steps.is_empty() {
        return Err(MalformedMove::Empty);
    }

    let mut res = p.clone();
    let ply = p.ply() + 1;

    for step in &mv.steps {
        if let Location::Board(sq) = step.src {
            let piece = res.take(sq).ok_or(MalformedMove::MissingPiece(sq))?;
            if piece.kind() != step.kind || piece.color() != step.color {
                return Err(MalformedMove::PieceMismatch(sq));
            }
        }
    }

    for step in &mv.steps {
        match step.dst {
            Location::Board(sq) => {
                if res.get(sq).is_some() {
                    return Err(MalformedMove::SquareCollision(sq));
                }
                res.place(Piece::with_last_move(step.kind, step.color, sq, ply));
            }
            Location::OffBoard => {
                if step.kind == PieceKind::King {
                    return Err(MalformedMove::KingRemoved(step.color));
                }
            }
        }
    }

    res.r.side = p.side().inv();
    res.r.ply = ply;
    res.r.ep_source = match mv.kind() {
        MoveKind::DoubleStep => mv.dst(),
        _ => None,
    };

    #[cfg(feature = "selftest")]
    if let Err(e) = res.validate() {
        panic!("position after move {} is invalid: {}", mv, e);
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessrules_base::{File, Rank};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn piece_at(p: &Position, s: &str) -> Piece {
        p.get(sq(s)).unwrap()
    }

    #[test]
    fn test_kinds() {
        let p = Position::from_diagram("r3k3/1P6/8/3pP3/8/8/4P3/R3K3").unwrap();
        let mut p = p;
        p.r.ply = 7;

        let pawn = piece_at(&p, "e2");
        assert_eq!(Move::quiet(pawn, sq("e3")).kind(), MoveKind::Quiet);
        assert_eq!(Move::quiet(pawn, sq("e4")).kind(), MoveKind::DoubleStep);

        let king = piece_at(&p, "e1");
        let rook = piece_at(&p, "a1");
        assert_eq!(
            Move::castling(king, rook, CastlingSide::Queen).kind(),
            MoveKind::Castling(CastlingSide::Queen)
        );

        let attacker = piece_at(&p, "e5");
        let victim = piece_at(&p, "d5");
        assert_eq!(Move::enpassant(attacker, sq("d6"), victim).kind(), MoveKind::Enpassant);

        let promoting = piece_at(&p, "b7");
        let rook8 = piece_at(&p, "a8");
        assert_eq!(
            Move::promotion(promoting, sq("a8"), PieceKind::Knight, Some(rook8)).kind(),
            MoveKind::Promotion {
                to: PieceKind::Knight,
                capture: true
            }
        );
        assert_eq!(
            Move::promotion(promoting, sq("b8"), PieceKind::Queen, None).kind(),
            MoveKind::Promotion {
                to: PieceKind::Queen,
                capture: false
            }
        );
        assert_eq!(Move::capture(promoting, rook8).kind(), MoveKind::Capture);
    }

    #[test]
    fn test_from_lists() {
        let e2 = Location::Board(sq("e2"));
        let e4 = Location::Board(sq("e4"));
        assert_eq!(
            Move::from_lists(&[(PieceKind::Pawn, Color::White, e2)], &[]),
            Err(MalformedMove::LengthMismatch {
                pieces: 1,
                destinations: 0
            })
        );
        assert_eq!(Move::from_lists(&[], &[]), Err(MalformedMove::Empty));
        let mv = Move::from_lists(&[(PieceKind::Pawn, Color::White, e2)], &[e4]).unwrap();
        assert_eq!(mv, Move::quiet(piece_at(&Position::initial(), "e2"), sq("e4")));

        let step = Step::create(PieceKind::Queen, Color::White, sq("a1"));
        assert_eq!(
            Move::new(&[step; 4]),
            Err(MalformedMove::TooManySteps(4))
        );
    }

    #[test]
    fn test_make_simple() {
        let p = Position::initial();
        let mv = Move::quiet(piece_at(&p, "e2"), sq("e4"));
        let q = make_move(&p, &mv).unwrap();
        assert_eq!(q.side(), Color::Black);
        assert_eq!(q.ply(), 1);
        assert_eq!(q.ep_source(), Some(sq("e4")));
        assert_eq!(q.get(sq("e2")), None);
        let pawn = piece_at(&q, "e4");
        assert!(pawn.moved_on(1));
        assert!(!pawn.has_never_moved());
        assert_eq!(q.as_diagram(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        // The original position is left untouched
        assert_eq!(p, Position::initial());

        let mv = Move::quiet(piece_at(&q, "g8"), sq("f6"));
        let r = make_move(&q, &mv).unwrap();
        assert_eq!(r.ep_source(), None);
        assert_eq!(r.ply(), 2);
    }

    #[test]
    fn test_make_castling() {
        let p = Position::from_diagram("4k3/8/8/8/8/8/8/R3K2R").unwrap();
        let mv = Move::castling(piece_at(&p, "e1"), piece_at(&p, "h1"), CastlingSide::King);
        let q = make_move(&p, &mv).unwrap();
        assert_eq!(q.as_diagram(), "4k3/8/8/8/8/8/8/R4RK1");
        assert_eq!(q.king_square(Color::White), Square::from_parts(File::G, Rank::R1));
    }

    #[test]
    fn test_make_promotion() {
        let p = Position::from_diagram("3rk3/4P3/8/8/8/8/8/4K3").unwrap();
        let pawn = piece_at(&p, "e7");
        let mv = Move::promotion(pawn, sq("d8"), PieceKind::Queen, Some(piece_at(&p, "d8")));
        let q = make_move(&p, &mv).unwrap();
        assert_eq!(q.as_diagram(), "3Qk3/8/8/8/8/8/8/4K3");
        assert!(piece_at(&q, "d8").moved_on(1));
    }

    #[test]
    fn test_malformed() {
        let p = Position::initial();
        let pawn = piece_at(&p, "e2");
        let knight = piece_at(&p, "g1");

        let mv = Move::quiet(pawn, sq("e4"));
        let q = make_move(&p, &mv).unwrap();
        assert_eq!(make_move(&q, &mv), Err(MalformedMove::MissingPiece(sq("e2"))));

        let fake = Move::quiet(Piece::new(PieceKind::Queen, Color::White, sq("e2")), sq("e4"));
        assert_eq!(make_move(&p, &fake), Err(MalformedMove::PieceMismatch(sq("e2"))));

        let clash = Move::quiet(knight, sq("f1"));
        assert_eq!(make_move(&p, &clash), Err(MalformedMove::SquareCollision(sq("f1"))));

        let regicide = Move::capture(knight, piece_at(&p, "e1"));
        assert_eq!(make_move(&p, &regicide), Err(MalformedMove::KingRemoved(Color::White)));
        let regicide = Move::new(&[Step::remove(piece_at(&p, "e8"))]).unwrap();
        assert_eq!(make_move(&p, &regicide), Err(MalformedMove::KingRemoved(Color::Black)));
    }
}
