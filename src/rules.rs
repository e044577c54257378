// =============================================================================
// Movement rules
//
// A rule belongs to one piece type and appends candidate moves for one piece
// at a time. Evaluation happens in two phases on every recomputation:
//
//   1. Movement: every movement rule runs for every active piece.
//   2. Reactive: rules that read other pieces' candidate moves (castling's
//      "is this square attacked" approximation) run once phase 1 is complete.
//
// Within a phase, rules run in registration order, so for a single piece the
// candidate list is the concatenation of its rules' output in that order.
// =============================================================================

use std::fmt;
use std::sync::Arc;

use crate::board::Board;
use crate::coord::{Direction, File, Rank, Square};
use crate::moves::{Displacement, Move};
use crate::piece::{Color, Piece, PieceType};
use crate::raycast::{multi_ray_cast, ray_cast, rays, MAX_RAY};

/// `(piece, board, out)`: inspect `piece` on the read-only `board` (history
/// included) and push candidate moves onto `out`.
pub type RuleFn = dyn Fn(&Piece, &Board, &mut Vec<Move>) + Send + Sync;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RulePhase {
    Movement,
    Reactive,
}

impl RulePhase {
    pub const ORDER: [RulePhase; 2] = [RulePhase::Movement, RulePhase::Reactive];
}

/// Which of the king's squares must not be a destination of any enemy
/// candidate move for castling to be offered.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum CastlingSafety {
    /// Only the square the king passes over.
    TransitOnly,
    /// The passed-over square and the landing square.
    #[default]
    TransitAndDestination,
    /// Also the king's current square, so no castling out of an attack.
    Full,
}

impl CastlingSafety {
    fn guarded(self, origin: Square, transit: Square, destination: Square) -> Vec<Square> {
        match self {
            CastlingSafety::TransitOnly => vec![transit],
            CastlingSafety::TransitAndDestination => vec![transit, destination],
            CastlingSafety::Full => vec![origin, transit, destination],
        }
    }
}

#[derive(Clone)]
pub struct Rule {
    name: String,
    piece_type: PieceType,
    phase: RulePhase,
    apply: Arc<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: impl Into<String>, piece_type: PieceType, phase: RulePhase, apply: F) -> Self
    where
        F: Fn(&Piece, &Board, &mut Vec<Move>) + Send + Sync + 'static,
    {
        Rule {
            name: name.into(),
            piece_type,
            phase,
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn piece_type(&self) -> &PieceType {
        &self.piece_type
    }

    pub(crate) fn run(&self, piece: &Piece, board: &Board, out: &mut Vec<Move>) {
        (self.apply)(piece, board, out)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("piece_type", &self.piece_type)
            .field("phase", &self.phase)
            .finish()
    }
}

/// Ordered rule registry.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eleven standard rules, in evaluation order.
    pub fn standard(safety: CastlingSafety) -> Self {
        let movement = RulePhase::Movement;
        let rules = vec![
            Rule::new("Pawn Quick Start", PieceType::Pawn, movement, pawn_quick_start),
            Rule::new("Pawn Forward Step", PieceType::Pawn, movement, pawn_forward_step),
            Rule::new("Pawn Diagonal Capture", PieceType::Pawn, movement, pawn_diagonal_capture),
            Rule::new("Pawn En Passant", PieceType::Pawn, movement, pawn_en_passant),
            Rule::new("Knight Jump", PieceType::Knight, movement, knight_jump),
            Rule::new("Rook Sliding", PieceType::Rook, movement, |p, b, out| {
                slide(p, b, &Direction::ORTHOGONAL, out)
            }),
            Rule::new("Bishop Sliding", PieceType::Bishop, movement, |p, b, out| {
                slide(p, b, &Direction::DIAGONAL, out)
            }),
            Rule::new("Queen Orthogonal Sliding", PieceType::Queen, movement, |p, b, out| {
                slide(p, b, &Direction::ORTHOGONAL, out)
            }),
            Rule::new("Queen Diagonal Sliding", PieceType::Queen, movement, |p, b, out| {
                slide(p, b, &Direction::DIAGONAL, out)
            }),
            Rule::new("King Step", PieceType::King, movement, king_step),
            Rule::new("King Castling", PieceType::King, RulePhase::Reactive, castling(safety)),
        ];
        RuleSet { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn in_phase(&self, phase: RulePhase) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.phase == phase)
    }

    /// Whether any rule moves pieces of `piece_type`.
    pub fn covers(&self, piece_type: &PieceType) -> bool {
        self.rules.iter().any(|r| &r.piece_type == piece_type)
    }
}

// -----------------------------------------------------------------------------
// Pawns
// -----------------------------------------------------------------------------

/// Two squares ahead on the first move, both squares empty.
fn pawn_quick_start(pawn: &Piece, board: &Board, out: &mut Vec<Move>) {
    if pawn.has_moved() {
        return;
    }
    let ahead = match pawn.color() {
        Color::White => Direction::NORTH,
        Color::Black => Direction::SOUTH,
    };
    if let [(_, None), (to, None)] = ray_cast(board, pawn.square(), ahead, 2).as_slice() {
        out.push(Move::step(pawn.id(), pawn.square(), *to, None));
    }
}

fn pawn_forward_step(pawn: &Piece, board: &Board, out: &mut Vec<Move>) {
    // Stepping onto the last rank would need promotion.
    let penultimate = match pawn.color() {
        Color::White => Rank::R7,
        Color::Black => Rank::R2,
    };
    if pawn.square().rank == penultimate {
        return;
    }
    let Some(to) = pawn.square().offset(0, pawn.color().forward()) else {
        return;
    };
    if board.piece_id_at(to).is_none() {
        out.push(Move::step(pawn.id(), pawn.square(), to, None));
    }
}

fn pawn_diagonal_capture(pawn: &Piece, board: &Board, out: &mut Vec<Move>) {
    for df in [-1, 1] {
        let Some(to) = pawn.square().offset(df, pawn.color().forward()) else {
            continue;
        };
        if let Some(target) = enemy_at(board, pawn.color(), to) {
            out.push(Move::step(pawn.id(), pawn.square(), to, Some(target.id())));
        }
    }
}

/// Capture a neighbouring enemy pawn whose one and only move was the last
/// move of the game, landing on the square it skipped.
fn pawn_en_passant(pawn: &Piece, board: &Board, out: &mut Vec<Move>) {
    let (capture_rank, landing_rank) = match pawn.color() {
        Color::White => (Rank::R5, Rank::R6),
        Color::Black => (Rank::R4, Rank::R3),
    };
    if pawn.square().rank != capture_rank {
        return;
    }
    let Some(last_ply) = board.history().len().checked_sub(1) else {
        return;
    };
    for df in [-1, 1] {
        let Some(beside) = pawn.square().offset(df, 0) else {
            continue;
        };
        let Some(victim) = enemy_at(board, pawn.color(), beside) else {
            continue;
        };
        if victim.piece_type() != &PieceType::Pawn || victim.history() != [last_ply] {
            continue;
        }
        if board.history()[last_ply].primary().piece != victim.id() {
            continue;
        }
        let landing = Square::new(beside.file, landing_rank);
        if board.piece_id_at(landing).is_none() {
            out.push(Move::step(pawn.id(), pawn.square(), landing, Some(victim.id())));
        }
    }
}

// -----------------------------------------------------------------------------
// Pieces
// -----------------------------------------------------------------------------

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-1, 2), (1, 2), (-2, 1), (2, 1),
    (-2, -1), (2, -1), (-1, -2), (1, -2),
];

fn knight_jump(knight: &Piece, board: &Board, out: &mut Vec<Move>) {
    for (df, dr) in KNIGHT_OFFSETS {
        let Some(to) = knight.square().offset(df, dr) else {
            continue;
        };
        match board.piece_at(to) {
            Some(other) if other.color() == knight.color() => {}
            other => out.push(Move::step(knight.id(), knight.square(), to, other.map(Piece::id))),
        }
    }
}

fn slide(piece: &Piece, board: &Board, directions: &[Direction], out: &mut Vec<Move>) {
    out.extend(multi_ray_cast(board, piece, &rays(directions, MAX_RAY)));
}

fn king_step(king: &Piece, board: &Board, out: &mut Vec<Move>) {
    out.extend(multi_ray_cast(board, king, &rays(&Direction::ALL, 1)));
}

/// King and unmoved rook on the home rank swap past each other: the king
/// lands two files toward the rook, the rook on the square the king crossed.
fn castling(safety: CastlingSafety) -> impl Fn(&Piece, &Board, &mut Vec<Move>) + Send + Sync {
    move |king, board, out| {
        let home = king.color().home_rank();
        if king.has_moved() || king.square().rank != home {
            return;
        }
        for (rook_file, step, direction) in [(File::H, 1, Direction::EAST), (File::A, -1, Direction::WEST)] {
            let rook_square = Square::new(rook_file, home);
            let Some(rook) = board.piece_at(rook_square) else {
                continue;
            };
            if rook.piece_type() != &PieceType::Rook || rook.color() != king.color() || rook.has_moved() {
                continue;
            }
            let gap = king.square().file.difference(rook_file);
            if gap.signum() != step || gap.abs() < 3 {
                continue;
            }
            // The first piece seen from the king must be the rook itself.
            let ray = ray_cast(board, king.square(), direction, MAX_RAY);
            if ray.last() != Some(&(rook_square, Some(rook.id()))) {
                continue;
            }
            let (Some(transit), Some(destination)) =
                (king.square().offset(step, 0), king.square().offset(2 * step, 0))
            else {
                continue;
            };
            let enemy = king.color().opposite();
            let attacked = safety
                .guarded(king.square(), transit, destination)
                .into_iter()
                .any(|sq| board.is_targeted_by(enemy, sq));
            if attacked {
                continue;
            }
            out.push(Move {
                displacements: vec![
                    Displacement { piece: king.id(), from: king.square(), to: destination },
                    Displacement { piece: rook.id(), from: rook_square, to: transit },
                ],
                captures: Vec::new(),
                promotion: None,
            });
        }
    }
}

fn enemy_at(board: &Board, color: Color, square: Square) -> Option<&Piece> {
    board.piece_at(square).filter(|p| p.color() != color)
}
