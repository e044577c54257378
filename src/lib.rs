pub mod board;
pub mod coord;
pub mod error;
pub mod moves;
pub mod piece;
pub mod raycast;
pub mod rules;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{standard_layout, Board, GameConfig};
pub use coord::{Direction, File, Rank, Square};
pub use error::{MoveError, ParseSquareError, SetupError};
pub use moves::{Displacement, Move};
pub use piece::{Color, CustomTag, Piece, PieceId, PieceType, Placement};
pub use rules::{CastlingSafety, Rule, RulePhase, RuleSet};
