//! Position and related things

use crate::attack::{self, AttackMap};
use crate::legal::{self, GameStatus};
use crate::movegen::MoveList;
use crate::moves::Make;
use chessrules_base::geometry;
use chessrules_base::{Color, File, PieceKind, Rank, Square};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Ply counter
///
/// The position after `n` half-moves from the start of the game has ply `n`. Pieces record the
/// ply of their most recent move, with `0` meaning that the piece has never moved.
pub type Ply = u32;

/// Position validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1th or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Square),
    /// A piece claims to have moved after the current ply
    #[error("piece on {0} has last move in the future")]
    InvalidLastMove(Square),
    /// En passant source is located on an invalid rank
    #[error("invalid enpassant position {0}")]
    InvalidEnpassant(Square),
    /// Opponent's king is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing a piece placement diagram
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum DiagramParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error building a [`Position`] from a diagram
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum DiagramError {
    /// Diagram cannot be parsed
    #[error("cannot parse diagram: {0}")]
    Parse(#[from] DiagramParseError),
    /// Diagram was parsed, but the position is invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Piece standing on the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    square: Square,
    last_move: Ply,
}

impl Piece {
    /// Creates a piece which has never moved
    pub const fn new(kind: PieceKind, color: Color, square: Square) -> Piece {
        Piece {
            kind,
            color,
            square,
            last_move: 0,
        }
    }

    /// Creates a piece whose most recent move happened at ply `last_move`
    pub const fn with_last_move(
        kind: PieceKind,
        color: Color,
        square: Square,
        last_move: Ply,
    ) -> Piece {
        Piece {
            kind,
            color,
            square,
            last_move,
        }
    }

    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn square(&self) -> Square {
        self.square
    }

    pub const fn last_move(&self) -> Ply {
        self.last_move
    }

    /// Returns `true` if the piece stays where it was put at setup
    pub const fn has_never_moved(&self) -> bool {
        self.last_move == 0
    }

    /// Returns `true` if the most recent move of the piece was made at ply `ply`
    pub const fn moved_on(&self, ply: Ply) -> bool {
        self.last_move != 0 && self.last_move == ply
    }

    pub fn as_char(&self) -> char {
        self.kind.as_char(self.color)
    }
}

/// Raw chess position
///
/// Raw position contains all the necessary information about the chess position. But, unlike
/// [`Position`], it is not validated and may contain an invalid position.
///
/// Raw position can be used to build the position programmatically. After putting the pieces,
/// it must be converted to [`Position`] via [`Position::try_from()`].
///
/// # Example
///
/// ```
/// # use chessrules::{RawPosition, Position, File, Rank, Color, PieceKind};
/// #
/// let mut raw = RawPosition::empty();
/// raw.put2(File::B, Rank::R2, Color::White, PieceKind::King);
/// raw.put2(File::D, Rank::R5, Color::Black, PieceKind::King);
///
/// let position: Position = raw.try_into().unwrap();
/// assert_eq!(position.as_diagram(), "8/8/8/3k4/8/8/1K6/8");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawPosition {
    cells: [Option<Piece>; Square::COUNT],
    /// Side to move
    pub side: Color,
    /// Number of half-moves made since the start of the game
    pub ply: Ply,
    /// En passant source square
    ///
    /// It is equal to `None` if no en passant is allowed. Otherwise, it contains the square with
    /// the pawn which has just made a two-square advance and can be captured en passant.
    pub ep_source: Option<Square>,
}

impl RawPosition {
    /// Returns an empty `RawPosition`
    ///
    /// Does the same as [`RawPosition::default()`], except that this function is `const`.
    #[inline]
    pub const fn empty() -> RawPosition {
        RawPosition {
            cells: [None; Square::COUNT],
            side: Color::White,
            ply: 0,
            ep_source: None,
        }
    }

    /// Returns a position with the standard initial arrangement
    pub fn initial() -> RawPosition {
        let mut res = RawPosition::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Color::White, PieceKind::Pawn);
            res.put2(file, Rank::R7, Color::Black, PieceKind::Pawn);
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            res.put2(File::A, rank, color, PieceKind::Rook);
            res.put2(File::B, rank, color, PieceKind::Knight);
            res.put2(File::C, rank, color, PieceKind::Bishop);
            res.put2(File::D, rank, color, PieceKind::Queen);
            res.put2(File::E, rank, color, PieceKind::King);
            res.put2(File::F, rank, color, PieceKind::Bishop);
            res.put2(File::G, rank, color, PieceKind::Knight);
            res.put2(File::H, rank, color, PieceKind::Rook);
        }
        res
    }

    /// Parses a piece placement diagram
    ///
    /// The diagram lists ranks from 8 down to 1 separated by `/`. Pieces are written as letters
    /// (uppercase for White, lowercase for Black), digits skip that many empty squares and `.`
    /// stands for a single empty square. All the pieces are considered to have never moved, White
    /// is to move.
    ///
    /// Does the same as [`RawPosition::from_str`].
    pub fn from_diagram(s: &str) -> Result<RawPosition, DiagramParseError> {
        RawPosition::from_str(s)
    }

    /// Returns the piece on square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    /// Returns the piece on the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Square::from_parts(file, rank))
    }

    /// Puts a piece which has never moved on square `sq`, replacing the previous contents
    #[inline]
    pub fn put(&mut self, sq: Square, color: Color, kind: PieceKind) {
        self.put_piece(Piece::new(kind, color, sq));
    }

    /// Puts a piece which has never moved on the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, color: Color, kind: PieceKind) {
        self.put(Square::from_parts(file, rank), color, kind);
    }

    /// Puts `piece` on its own square, replacing the previous contents
    #[inline]
    pub fn put_piece(&mut self, piece: Piece) {
        self.cells[piece.square().index()] = Some(piece);
    }

    /// Removes and returns the piece on square `sq`
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()].take()
    }

    /// Iterates over all the pieces on the board, from `a1` to `h8`
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Wraps the position to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use chessrules::{RawPosition, position::PrettyStyle};
    /// #
    /// let r = RawPosition::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }

    /// Converts the piece placement into a diagram accepted by [`RawPosition::from_diagram()`]
    pub fn as_diagram(&self) -> String {
        let mut res = String::new();
        for (i, rank) in Rank::iter().rev().enumerate() {
            if i != 0 {
                res.push('/');
            }
            let mut empty = 0_u8;
            for file in File::iter() {
                match self.get2(file, rank) {
                    Some(piece) => {
                        if empty != 0 {
                            res.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        res.push(piece.as_char());
                    }
                    None => empty += 1,
                }
            }
            if empty != 0 {
                res.push((b'0' + empty) as char);
            }
        }
        res
    }
}

impl Default for RawPosition {
    #[inline]
    fn default() -> RawPosition {
        RawPosition::empty()
    }
}

impl FromStr for RawPosition {
    type Err = DiagramParseError;

    fn from_str(s: &str) -> Result<RawPosition, Self::Err> {
        type Error = DiagramParseError;

        let mut res = RawPosition::empty();
        // `row` counts ranks from the top of the diagram, i.e. row 0 is rank 8
        let mut file = 0_usize;
        let mut row = 0_usize;
        let rank_of = |row: usize| Rank::from_index(7 - row);
        for c in s.trim().chars() {
            match c {
                '1'..='8' => {
                    let add = (u32::from(c) - u32::from('0')) as usize;
                    if file + add > 8 {
                        return Err(Error::RankOverflow(rank_of(row)));
                    }
                    file += add;
                }
                '.' => {
                    if file >= 8 {
                        return Err(Error::RankOverflow(rank_of(row)));
                    }
                    file += 1;
                }
                '/' => {
                    if file < 8 {
                        return Err(Error::RankUnderflow(rank_of(row)));
                    }
                    row += 1;
                    file = 0;
                    if row >= 8 {
                        return Err(Error::Overflow);
                    }
                }
                _ => {
                    if file >= 8 {
                        return Err(Error::RankOverflow(rank_of(row)));
                    }
                    let (color, kind) = PieceKind::from_char(c).ok_or(Error::UnexpectedChar(c))?;
                    res.put2(File::from_index(file), rank_of(row), color, kind);
                    file += 1;
                }
            }
        }
        if file < 8 {
            return Err(Error::RankUnderflow(rank_of(row)));
        }
        if row < 7 {
            return Err(Error::Underflow);
        }
        Ok(res)
    }
}

/// Position that is valid under the rules of chess
///
/// It is used for every rules operation: move generation, making moves, detecting check,
/// checkmate and stalemate. It contains a [`RawPosition`] alongside with the cached king squares.
///
/// A `Position` is a plain value. Making a move produces a new position and leaves the original
/// one untouched, so positions can be freely cloned and sent to other threads for analysis.
#[derive(Debug, Clone)]
pub struct Position {
    pub(crate) r: RawPosition,
    pub(crate) kings: [Square; 2],
}

impl Position {
    /// Returns the standard initial position
    pub fn initial() -> Position {
        RawPosition::initial()
            .try_into()
            .expect("initial position is valid")
    }

    /// Parses a position from a piece placement diagram, with White to move
    ///
    /// See [`RawPosition::from_diagram()`] for the format.
    pub fn from_diagram(s: &str) -> Result<Position, DiagramError> {
        Ok(RawPosition::from_diagram(s)?.try_into()?)
    }

    /// Returns a view over the raw position
    #[inline]
    pub fn raw(&self) -> &RawPosition {
        &self.r
    }

    /// Returns the piece on square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.r.get(sq)
    }

    /// Returns the piece on the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.r.get2(file, rank)
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    /// Returns the number of half-moves made since the start of the game
    #[inline]
    pub fn ply(&self) -> Ply {
        self.r.ply
    }

    /// Returns the pawn that can be captured en passant, if any
    #[inline]
    pub fn ep_source(&self) -> Option<Square> {
        self.r.ep_source
    }

    /// Iterates over all the pieces on the board
    #[inline]
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.r.pieces()
    }

    /// Iterates over all the pieces of color `c`
    #[inline]
    pub fn pieces_of(&self, c: Color) -> impl Iterator<Item = Piece> + '_ {
        self.r.pieces().filter(move |p| p.color() == c)
    }

    /// Returns the square of the king of color `c`
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        self.kings[c.index()]
    }

    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        self.r.remove(sq)
    }

    pub(crate) fn place(&mut self, piece: Piece) {
        if piece.kind() == PieceKind::King {
            self.kings[piece.color().index()] = piece.square();
        }
        self.r.put_piece(piece);
    }

    /// Returns the squares attacked by the pieces of color `c`
    #[inline]
    pub fn attacks(&self, c: Color) -> AttackMap {
        attack::attacks(self, c)
    }

    /// Returns `true` if the current side is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        let c = self.r.side;
        attack::is_square_attacked(self, self.king_square(c), c.inv())
    }

    /// Returns `true` if the opponent's king is under attack
    ///
    /// This never holds for a position reached through legal moves.
    #[inline]
    pub fn is_opponent_king_attacked(&self) -> bool {
        let c = self.r.side;
        attack::is_square_attacked(self, self.king_square(c.inv()), c)
    }

    /// Returns all the legal moves in this position
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        legal::gen_all(self)
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        legal::has_legal_moves(self)
    }

    /// Classifies the position as ongoing, check, checkmate or stalemate
    ///
    /// This function can be computationally expensive, as it calls
    /// [`legal::has_legal_moves()`].
    #[inline]
    pub fn status(&self) -> GameStatus {
        legal::game_status(self)
    }

    /// Convenience alias for [`moves::Make::make`](crate::moves::Make::make)
    pub fn make_move<M: Make>(&self, m: M) -> Result<Self, M::Err> {
        m.make(self)
    }

    /// Wraps the position to allow pretty-printing with the given style `Style`
    ///
    /// See docs for [`RawPosition::pretty()`] for more usage details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }

    /// Converts the piece placement into a diagram
    #[inline]
    pub fn as_diagram(&self) -> String {
        self.r.as_diagram()
    }

    /// Checks the position against the same rules as [`Position::try_from()`]
    ///
    /// Always succeeds for positions reached through legal moves.
    pub fn validate(&self) -> Result<(), ValidateError> {
        Position::try_from(self.r).map(|_| ())
    }
}

impl PartialEq for Position {
    #[inline]
    fn eq(&self, other: &Position) -> bool {
        self.r == other.r
    }
}

impl Eq for Position {}

impl Hash for Position {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::initial()
    }
}

impl TryFrom<RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(mut raw: RawPosition) -> Result<Position, ValidateError> {
        let mut counts = [0_usize; 2];
        let mut kings: [Option<Square>; 2] = [None, None];
        for piece in raw.pieces() {
            let c = piece.color();
            counts[c.index()] += 1;
            if piece.last_move() > raw.ply {
                return Err(ValidateError::InvalidLastMove(piece.square()));
            }
            match piece.kind() {
                PieceKind::King => {
                    if kings[c.index()].replace(piece.square()).is_some() {
                        return Err(ValidateError::TooManyKings(c));
                    }
                }
                PieceKind::Pawn => {
                    if matches!(piece.square().rank(), Rank::R1 | Rank::R8) {
                        return Err(ValidateError::InvalidPawn(piece.square()));
                    }
                }
                _ => {}
            }
        }

        // Check TooManyPieces, NoKing
        for c in [Color::White, Color::Black] {
            if counts[c.index()] > 16 {
                return Err(ValidateError::TooManyPieces(c));
            }
        }
        let white_king = kings[Color::White.index()].ok_or(ValidateError::NoKing(Color::White))?;
        let black_king = kings[Color::Black.index()].ok_or(ValidateError::NoKing(Color::Black))?;

        // Check enpassant
        if let Some(p) = raw.ep_source {
            let them = raw.side.inv();
            if p.rank() != geometry::double_step_rank(them) {
                return Err(ValidateError::InvalidEnpassant(p));
            }

            // Reset enpassant if the pawn did not just arrive there or its path is occupied
            let fresh_pawn = raw.get(p).map_or(false, |piece| {
                piece.kind() == PieceKind::Pawn
                    && piece.color() == them
                    && piece.moved_on(raw.ply)
            });
            let passed = p.try_shift(0, raw.side.forward());
            if !fresh_pawn || passed.map_or(true, |sq| raw.get(sq).is_some()) {
                raw.ep_source = None;
            }
        }

        // Check OpponentKingAttacked
        let res = Position {
            r: raw,
            kings: [white_king, black_king],
        };
        if res.is_opponent_king_attacked() {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(res)
    }
}

impl TryFrom<&RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: &RawPosition) -> Result<Position, ValidateError> {
        (*raw).try_into()
    }
}

impl FromStr for Position {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        Position::from_diagram(s)
    }
}

/// Style for [`RawPosition::pretty()`] and [`Position::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the position
///
/// See docs for [`RawPosition::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawPosition,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(p: Option<Piece>) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(r: &RawPosition, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(r.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(r.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(p: Option<Piece>) -> char {
        p.map_or('.', |p| p.as_char())
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(p: Option<Piece>) -> char {
        p.map_or('.', |p| p.kind().as_utf8_char(p.color()))
    }
}

impl<'a> fmt::Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    const INI_DIAGRAM: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_size() {
        assert!(mem::size_of::<Piece>() <= 8);
    }

    #[test]
    fn test_initial() {
        assert_eq!(RawPosition::initial().as_diagram(), INI_DIAGRAM);
        assert_eq!(Position::initial().as_diagram(), INI_DIAGRAM);
        assert_eq!(RawPosition::from_diagram(INI_DIAGRAM), Ok(RawPosition::initial()));
        assert_eq!(Position::from_diagram(INI_DIAGRAM), Ok(Position::initial()));

        let p = Position::initial();
        assert_eq!(p.side(), Color::White);
        assert_eq!(p.ply(), 0);
        assert_eq!(p.ep_source(), None);
        assert_eq!(p.pieces().count(), 32);
        assert!(p.pieces().all(|piece| piece.has_never_moved()));
        assert_eq!(p.king_square(Color::White), Square::from_parts(File::E, Rank::R1));
        assert_eq!(p.king_square(Color::Black), Square::from_parts(File::E, Rank::R8));
    }

    #[test]
    fn test_dotted_diagram() {
        let dotted = "....k.../8/8/8/8/8/8/....K..R";
        let compact = "4k3/8/8/8/8/8/8/4K2R";
        assert_eq!(RawPosition::from_diagram(dotted), RawPosition::from_diagram(compact));
        assert_eq!(RawPosition::from_diagram(dotted).unwrap().as_diagram(), compact);
    }

    #[test]
    fn test_bad_diagrams() {
        assert_eq!(
            RawPosition::from_diagram("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP"),
            Err(DiagramParseError::Underflow)
        );
        assert_eq!(
            RawPosition::from_diagram("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(DiagramParseError::RankOverflow(Rank::R7))
        );
        assert_eq!(
            RawPosition::from_diagram("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(DiagramParseError::RankUnderflow(Rank::R7))
        );
        assert_eq!(
            RawPosition::from_diagram("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/8"),
            Err(DiagramParseError::Overflow)
        );
        assert_eq!(
            RawPosition::from_diagram("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX"),
            Err(DiagramParseError::UnexpectedChar('X'))
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            Position::from_diagram("8/8/8/8/8/8/8/4K3"),
            Err(DiagramError::Valid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Position::from_diagram("4k3/8/8/8/8/8/8/3KK3"),
            Err(DiagramError::Valid(ValidateError::TooManyKings(Color::White)))
        );
        assert_eq!(
            Position::from_diagram("P3k3/8/8/8/8/8/8/4K3"),
            Err(DiagramError::Valid(ValidateError::InvalidPawn(
                Square::from_parts(File::A, Rank::R8)
            )))
        );
        assert_eq!(
            Position::from_diagram("4k3/8/8/8/8/8/8/4K2Q"),
            Ok(Position::from_diagram("4k3/8/8/8/8/8/8/4K2Q").unwrap())
        );
        assert_eq!(
            Position::from_diagram("4k3/8/8/8/8/8/8/4R1K1"),
            Err(DiagramError::Valid(ValidateError::OpponentKingAttacked))
        );

        let mut raw = RawPosition::from_diagram("4k3/8/8/8/8/8/8/4K3").unwrap();
        raw.put_piece(Piece::with_last_move(
            PieceKind::Rook,
            Color::White,
            Square::from_parts(File::A, Rank::R1),
            3,
        ));
        assert_eq!(
            Position::try_from(raw),
            Err(ValidateError::InvalidLastMove(Square::from_parts(File::A, Rank::R1)))
        );
    }

    #[test]
    fn test_enpassant_fixes() {
        let mut raw = RawPosition::from_diagram("4k3/8/8/2pP4/8/8/8/4K3").unwrap();
        raw.ply = 5;
        raw.ep_source = Some(Square::from_parts(File::C, Rank::R5));
        // The pawn on c5 has never moved, so it cannot be captured en passant
        let p = Position::try_from(raw).unwrap();
        assert_eq!(p.ep_source(), None);

        raw.put_piece(Piece::with_last_move(
            PieceKind::Pawn,
            Color::Black,
            Square::from_parts(File::C, Rank::R5),
            5,
        ));
        let p = Position::try_from(raw).unwrap();
        assert_eq!(p.ep_source(), Some(Square::from_parts(File::C, Rank::R5)));

        raw.ep_source = Some(Square::from_parts(File::C, Rank::R6));
        assert_eq!(
            Position::try_from(raw),
            Err(ValidateError::InvalidEnpassant(Square::from_parts(File::C, Rank::R6)))
        );
    }

    #[test]
    fn test_pretty() {
        let p = Position::from_diagram("4k3/8/8/8/8/8/8/4K3").unwrap();
        let res = "8|....k...\n7|........\n6|........\n5|........\n4|........\n\
                   3|........\n2|........\n1|....K...\n-+--------\nW|abcdefgh\n";
        assert_eq!(p.pretty(PrettyStyle::Ascii).to_string(), res);
    }
}
