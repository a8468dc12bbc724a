//! Textual form of moves
//!
//! Each step is written as `<label><origin>-><destination>`, where the label is empty for pawns and
//! one of `N`, `B`, `R`, `Q`, `K` otherwise, and `--` stands for a location off the board. Steps
//! are joined with `", "`, so a kingside castling for White is written as `Ke1->g1, Rh1->f1`.

use super::base::{Location, MalformedMove, Move, Step};
use crate::legal;
use crate::position::Position;
use chessrules_base::{PieceKind, Square};

use std::fmt;

use thiserror::Error;

const OFF_BOARD: &str = "--";
const ARROW: &str = "->";

/// Error parsing a move from its notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum NotationError {
    /// String is empty
    #[error("string is empty")]
    Empty,
    /// Piece label is not recognized
    #[error("bad piece label {0:?}")]
    BadLabel(char),
    /// Location is neither a square nor `--`
    #[error("bad location {0:?}")]
    BadSquare(String),
    /// No `->` between the locations
    #[error("missing arrow in {0:?}")]
    MissingArrow(String),
    /// The text is well-formed, but no legal move has such notation
    #[error("no such move: {0}")]
    NoSuchMove(String),
    /// The move is found, but cannot be applied
    #[error("cannot apply move: {0}")]
    MalformedMove(#[from] MalformedMove),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Location::Board(sq) => write!(f, "{}", sq),
            Location::OffBoard => write!(f, "{}", OFF_BOARD),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}{}{}", self.kind.label(), self.src, ARROW, self.dst)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, step) in self.steps().iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Parsed step without color
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct RawStep {
    kind: PieceKind,
    src: Location,
    dst: Location,
}

impl RawStep {
    fn matches(&self, step: &Step) -> bool {
        self.kind == step.kind && self.src == step.src && self.dst == step.dst
    }
}

fn parse_location(s: &str) -> Result<Location, NotationError> {
    if s == OFF_BOARD {
        return Ok(Location::OffBoard);
    }
    s.parse::<Square>()
        .map(Location::Board)
        .map_err(|_| NotationError::BadSquare(s.to_string()))
}

// The text cannot be split on the arrow, as in `Q--->e8` the off-board origin runs into it
fn parse_step(s: &str) -> Result<RawStep, NotationError> {
    let s = s.trim();
    let first = s.chars().next().ok_or(NotationError::Empty)?;
    let (kind, rest) = if first.is_ascii_uppercase() {
        let kind = PieceKind::from_label(first).ok_or(NotationError::BadLabel(first))?;
        (kind, &s[1..])
    } else {
        (PieceKind::Pawn, s)
    };
    let src = rest
        .get(..2)
        .ok_or_else(|| NotationError::BadSquare(rest.to_string()))?;
    let tail = &rest[2..];
    let dst = tail
        .strip_prefix(ARROW)
        .ok_or_else(|| NotationError::MissingArrow(s.to_string()))?;
    Ok(RawStep {
        kind,
        src: parse_location(src)?,
        dst: parse_location(dst.trim())?,
    })
}

fn parse_steps(s: &str) -> Result<Vec<RawStep>, NotationError> {
    if s.trim().is_empty() {
        return Err(NotationError::Empty);
    }
    s.split(',').map(parse_step).collect()
}

impl Move {
    /// Parses the move from its notation, if `p` is the position preceding this move
    ///
    /// The returned move is guaranteed to be **legal**. Whitespace around the commas separating
    /// the steps is ignored.
    pub fn from_notation(s: &str, p: &Position) -> Result<Move, NotationError> {
        let raw = parse_steps(s)?;
        legal::gen_all(p)
            .into_iter()
            .find(|mv| {
                mv.steps().len() == raw.len()
                    && raw.iter().zip(mv.steps()).all(|(r, step)| r.matches(step))
            })
            .ok_or_else(|| NotationError::NoSuchMove(s.trim().to_string()))
    }
}
