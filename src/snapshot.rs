use serde::Serialize;

use crate::board::Board;
use crate::coord::{File, Rank, Square};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct SquarePiece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl From<&Piece> for SquarePiece {
    fn from(piece: &Piece) -> Self {
        SquarePiece {
            piece_type: piece.piece_type().clone(),
            color: piece.color(),
        }
    }
}

/// What a UI needs to draw one candidate move.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct MoveSummary {
    pub from: Square,
    pub to: Square,
    /// Squares of the captured pieces, which differ from `to` for en passant.
    pub captures: Vec<Square>,
    /// Secondary pieces travelling along, e.g. the castling rook.
    pub also_moves: Vec<[Square; 2]>,
}

impl MoveSummary {
    pub fn new(board: &Board, mv: &Move) -> Self {
        MoveSummary {
            from: mv.from(),
            to: mv.to(),
            captures: mv.captures.iter().map(|&id| board.piece(id).square()).collect(),
            also_moves: mv.displacements[1..].iter().map(|d| [d.from, d.to]).collect(),
        }
    }
}

/// Read-only picture of a board for presentation layers.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct BoardSnapshot {
    /// `squares[rank][file]`, rank 1 first.
    pub squares: Vec<Vec<Option<SquarePiece>>>,
    pub current_turn: Color,
    pub legal_moves: Vec<MoveSummary>,
    pub captured_white: Vec<PieceType>,
    pub captured_black: Vec<PieceType>,
    pub last_move: Option<MoveSummary>,
    pub history_len: usize,
}

impl BoardSnapshot {
    pub fn new(board: &Board) -> Self {
        let squares: Vec<Vec<Option<SquarePiece>>> = Rank::ALL
            .iter()
            .map(|&rank| {
                File::ALL
                    .iter()
                    .map(|&file| board.piece_at(Square::new(file, rank)).map(SquarePiece::from))
                    .collect::<Vec<_>>()
            })
            .collect();
        let captured = |color: Color| -> Vec<PieceType> {
            board
                .captured(Some(color))
                .into_iter()
                .map(|p| p.piece_type().clone())
                .collect()
        };
        BoardSnapshot {
            squares,
            current_turn: board.turn(),
            legal_moves: board.candidates().into_iter().map(|m| MoveSummary::new(board, m)).collect(),
            captured_white: captured(Color::White),
            captured_black: captured(Color::Black),
            last_move: board.history().last().map(|m| MoveSummary::new(board, m)),
            history_len: board.history().len(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
