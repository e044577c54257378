use thiserror::Error;

use crate::coord::Square;
use crate::piece::{Color, PieceType};

/// Why a command left the board untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("the {color} piece on {square} cannot move while it is not {color}'s turn")]
    NotYourTurn { square: Square, color: Color },
    #[error("no candidate move from {from} to {to}")]
    NoCandidate { from: Square, to: Square },
    #[error("no moves to undo")]
    NothingToUndo,
}

/// Rejected game construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("two pieces placed on {0}")]
    OccupiedSquare(Square),
    #[error("no rule registered for piece type {0}")]
    MissingRule(PieceType),
    #[error("custom piece tag {0:?} collides with a standard piece type")]
    ReservedTag(String),
    #[error("custom piece tag is empty")]
    EmptyTag,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSquareError {
    #[error("expected two characters, got {0:?}")]
    BadLength(String),
    #[error("unexpected file char {0:?}")]
    BadFile(char),
    #[error("unexpected rank char {0:?}")]
    BadRank(char),
}
