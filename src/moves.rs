use serde::Serialize;

use crate::coord::Square;
use crate::piece::{PieceId, PieceType};

/// One piece travelling from one square to another as part of a move.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Displacement {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
}

/// A candidate move, and once applied, the history record of it.
///
/// `displacements[0]` is always the piece the player selected, so a move needs
/// at least one displacement. Castling has a second displacement for the rook.
/// Captured pieces need not stand on any destination square (en passant).
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Move {
    pub displacements: Vec<Displacement>,
    pub captures: Vec<PieceId>,
    /// Reserved for a type change on arrival. The standard rules never set it.
    // TODO: honor this in `Board::commit` (and restore on undo) once pawn promotion has a policy.
    pub promotion: Option<PieceType>,
}

impl Move {
    /// A single piece moving, optionally capturing the piece at `to`.
    pub fn step(piece: PieceId, from: Square, to: Square, capture: Option<PieceId>) -> Move {
        Move {
            displacements: vec![Displacement { piece, from, to }],
            captures: capture.into_iter().collect(),
            promotion: None,
        }
    }

    /// The selected piece's displacement.
    ///
    /// Panics if `displacements` is empty. The board discards such moves when
    /// a rule produces them, so candidates and history entries always have one.
    pub fn primary(&self) -> &Displacement {
        &self.displacements[0]
    }

    pub fn from(&self) -> Square {
        self.primary().from
    }

    pub fn to(&self) -> Square {
        self.primary().to
    }

    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}
