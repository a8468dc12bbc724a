//! # Base types for chessrules
//!
//! This is an auxiliary crate for `chessrules`, which contains the plain value types (squares,
//! colors, piece kinds, square sets) and the color-relative board geometry. It knows nothing
//! about the rules of the game.
//!
//! Normally you don't want to use this crate directly. Use `chessrules` instead, which re-exports
//! everything from here.

pub mod geometry;
pub mod squareset;
pub mod types;

pub use squareset::SquareSet;
pub use types::{
    CastlingSide, Color, File, OutOfBounds, PieceKind, Rank, Square,
    SquareParseError,
};
