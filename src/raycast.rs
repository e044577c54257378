use crate::board::Board;
use crate::coord::{Direction, Square};
use crate::moves::Move;
use crate::piece::{Piece, PieceId};

/// Longest ray that fits on the board.
pub const MAX_RAY: u8 = 8;

/// Walk from `origin` (exclusive) one step at a time in `direction`.
///
/// Each square reached is returned with its occupant. The walk ends after
/// `max_len` squares, at the board edge, or right after the first occupied
/// square, which is included.
pub fn ray_cast(
    board: &Board,
    origin: Square,
    direction: Direction,
    max_len: u8,
) -> Vec<(Square, Option<PieceId>)> {
    let mut squares = Vec::new();
    let mut current = origin;
    while squares.len() < max_len as usize {
        let Some(next) = direction.step(current) else {
            break;
        };
        let occupant = board.piece_id_at(next);
        squares.push((next, occupant));
        if occupant.is_some() {
            break;
        }
        current = next;
    }
    squares
}

/// Turn several rays from `piece` into candidate moves.
///
/// Empty squares become quiet moves, an enemy-occupied square becomes a
/// capture of that piece, and a friendly-occupied square yields nothing.
pub fn multi_ray_cast(board: &Board, piece: &Piece, rays: &[(Direction, u8)]) -> Vec<Move> {
    let mut moves = Vec::new();
    for &(direction, max_len) in rays {
        for (square, occupant) in ray_cast(board, piece.square(), direction, max_len) {
            match occupant {
                None => moves.push(Move::step(piece.id(), piece.square(), square, None)),
                Some(other) if board.piece(other).color() != piece.color() => {
                    moves.push(Move::step(piece.id(), piece.square(), square, Some(other)))
                }
                Some(_) => {}
            }
        }
    }
    moves
}

/// `directions` with the same length limit on each.
pub fn rays(directions: &[Direction], max_len: u8) -> Vec<(Direction, u8)> {
    directions.iter().map(|&d| (d, max_len)).collect()
}
