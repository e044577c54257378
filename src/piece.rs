use std::fmt;

use serde::Serialize;

use crate::coord::{Rank, Square};
use crate::error::SetupError;
use crate::moves::Move;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step a pawn of this color advances by.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank the king and rooks start on.
    pub fn home_rank(self) -> Rank {
        match self {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// The six standard kinds, plus variant pieces identified by a tag.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Custom(CustomTag),
}

/// Name of a variant piece type. Only [`PieceType::custom`] builds one, so a
/// tag never collides with a standard piece name.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct CustomTag(String);

impl CustomTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PieceType {
    pub const STANDARD: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Queen,
        PieceType::King,
    ];

    /// A variant piece type. Tags naming a standard piece are refused so the
    /// standard six cannot be redefined.
    ///
    /// ```compile_fail
    /// use chess_rules::piece::{CustomTag, PieceType};
    /// let pawn = PieceType::Custom(CustomTag("pawn".to_string()));
    /// ```
    pub fn custom(tag: impl Into<String>) -> Result<PieceType, SetupError> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(SetupError::EmptyTag);
        }
        let shadows = PieceType::STANDARD
            .iter()
            .any(|pt| pt.tag().eq_ignore_ascii_case(tag.trim()));
        if shadows {
            return Err(SetupError::ReservedTag(tag));
        }
        Ok(PieceType::Custom(CustomTag(tag)))
    }

    pub fn tag(&self) -> &str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Rook => "rook",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Queen => "queen",
            PieceType::King => "king",
            PieceType::Custom(tag) => tag.as_str(),
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, PieceType::Custom(_))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Stable handle of a piece for the lifetime of a game.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct PieceId(pub(crate) usize);

/// Where a piece starts when a game begins.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Placement {
    pub piece_type: PieceType,
    pub color: Color,
    pub square: Square,
}

impl Placement {
    pub fn new(piece_type: PieceType, color: Color, square: Square) -> Self {
        Placement { piece_type, color, square }
    }
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub(crate) id: PieceId,
    pub(crate) piece_type: PieceType,
    pub(crate) color: Color,
    pub(crate) square: Square,
    /// Plies (indices into the game history) this piece was displaced in.
    pub(crate) history: Vec<usize>,
    pub(crate) candidates: Vec<Move>,
}

impl Piece {
    pub(crate) fn new(id: PieceId, placement: Placement) -> Self {
        Piece {
            id,
            piece_type: placement.piece_type,
            color: placement.color,
            square: placement.square,
            history: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn piece_type(&self) -> &PieceType {
        &self.piece_type
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn has_moved(&self) -> bool {
        !self.history.is_empty()
    }

    /// Moves cached by the last recomputation, regardless of whose turn it is.
    pub fn candidates(&self) -> &[Move] {
        &self.candidates
    }
}
