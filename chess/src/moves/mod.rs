mod base;
mod make;
mod notation;

pub use base::*;
pub use make::*;
pub use notation::NotationError;
