use std::sync::Arc;

use crate::coord::{File, Rank, Square};
use crate::error::{MoveError, SetupError};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceId, PieceType, Placement};
use crate::rules::{CastlingSafety, Rule, RulePhase, RuleSet};

/// How a game is set up. `GameConfig::default()` is standard chess.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Start from the standard 32 pieces; `placements` are added to them.
    pub standard_pieces: bool,
    /// Register the eleven standard rules before `rules`.
    pub standard_rules: bool,
    pub placements: Vec<Placement>,
    pub rules: Vec<Rule>,
    pub first_turn: Color,
    pub castling_safety: CastlingSafety,
    /// Refuse to move a piece whose owner is not on turn. Off by default: only
    /// `moves_from` filters by turn, and `apply` takes any cached candidate.
    pub enforce_turn: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        GameConfig {
            standard_pieces: true,
            standard_rules: true,
            placements: Vec::new(),
            rules: Vec::new(),
            first_turn: Color::White,
            castling_safety: CastlingSafety::default(),
            enforce_turn: false,
        }
    }

    /// Standard rules on an empty board. Useful for setting up test positions.
    pub fn empty() -> Self {
        GameConfig {
            standard_pieces: false,
            ..Self::new()
        }
    }

    /// Toggle the standard pieces and the standard rules together.
    pub fn include_standard(mut self, include: bool) -> Self {
        self.standard_pieces = include;
        self.standard_rules = include;
        self
    }

    pub fn with_placements(mut self, placements: Vec<Placement>) -> Self {
        self.placements.extend(placements);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn first_turn(mut self, color: Color) -> Self {
        self.first_turn = color;
        self
    }

    pub fn castling_safety(mut self, safety: CastlingSafety) -> Self {
        self.castling_safety = safety;
        self
    }

    pub fn enforce_turn(mut self, enforce: bool) -> Self {
        self.enforce_turn = enforce;
        self
    }
}

/// The standard opening position.
pub fn standard_layout() -> Vec<Placement> {
    const BACK_RANK: [PieceType; 8] = [
        PieceType::Rook, PieceType::Knight, PieceType::Bishop, PieceType::Queen,
        PieceType::King, PieceType::Bishop, PieceType::Knight, PieceType::Rook,
    ];
    let mut placements = Vec::with_capacity(32);
    for (color, back, pawns) in [
        (Color::White, Rank::R1, Rank::R2),
        (Color::Black, Rank::R8, Rank::R7),
    ] {
        for (file, piece_type) in File::ALL.into_iter().zip(BACK_RANK) {
            placements.push(Placement::new(piece_type, color, Square::new(file, back)));
        }
        for file in File::ALL {
            placements.push(Placement::new(PieceType::Pawn, color, Square::new(file, pawns)));
        }
    }
    placements
}

/// Game state: pieces, the square index, history and turn.
///
/// Every command rebuilds the square index and recomputes every piece's
/// candidate moves from scratch, so queries always see a consistent snapshot.
#[derive(Clone, Debug)]
pub struct Board {
    /// Every piece of the game, indexed by `PieceId`. Captured pieces stay here.
    pieces: Vec<Piece>,
    /// Ids on the board, kept sorted.
    active: Vec<PieceId>,
    /// Ids off the board, most recent capture last.
    captured: Vec<PieceId>,
    /// `[rank][file]`, derived from `active`.
    squares: [[Option<PieceId>; 8]; 8],
    history: Vec<Move>,
    current_turn: Color,
    enforce_turn: bool,
    rules: Arc<RuleSet>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard chess from the opening position.
    pub fn new() -> Self {
        let config = GameConfig::new();
        Self::assemble(
            standard_layout(),
            RuleSet::standard(config.castling_safety),
            config.first_turn,
            config.enforce_turn,
        )
    }

    /// Build a game from `config`, rejecting overlapping placements and
    /// custom piece types nothing knows how to move.
    pub fn begin(config: GameConfig) -> Result<Self, SetupError> {
        let mut placements = if config.standard_pieces {
            standard_layout()
        } else {
            Vec::new()
        };
        placements.extend(config.placements);

        let mut rules = if config.standard_rules {
            RuleSet::standard(config.castling_safety)
        } else {
            RuleSet::new()
        };
        for rule in config.rules {
            rules.push(rule);
        }

        let mut taken = [[false; 8]; 8];
        for placement in &placements {
            let sq = placement.square;
            if std::mem::replace(&mut taken[sq.rank.index()][sq.file.index()], true) {
                return Err(SetupError::OccupiedSquare(sq));
            }
            if !placement.piece_type.is_standard() && !rules.covers(&placement.piece_type) {
                return Err(SetupError::MissingRule(placement.piece_type.clone()));
            }
        }

        Ok(Self::assemble(placements, rules, config.first_turn, config.enforce_turn))
    }

    fn assemble(placements: Vec<Placement>, rules: RuleSet, first_turn: Color, enforce_turn: bool) -> Self {
        let pieces: Vec<Piece> = placements
            .into_iter()
            .enumerate()
            .map(|(i, placement)| Piece::new(PieceId(i), placement))
            .collect();
        let mut board = Board {
            active: pieces.iter().map(Piece::id).collect(),
            pieces,
            captured: Vec::new(),
            squares: [[None; 8]; 8],
            history: Vec::new(),
            current_turn: first_turn,
            enforce_turn,
            rules: Arc::new(rules),
        };
        board.recompute();
        board
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn turn(&self) -> Color {
        self.current_turn
    }

    pub fn piece_id_at(&self, square: Square) -> Option<PieceId> {
        self.squares[square.rank.index()][square.file.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.piece_id_at(square).map(|id| self.piece(id))
    }

    pub fn occupant_at(&self, square: Square) -> Option<(&PieceType, Color)> {
        self.piece_at(square).map(|p| (p.piece_type(), p.color()))
    }

    /// Any piece of this game, on the board or captured.
    ///
    /// Panics if `id` came from a different game.
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    /// Pieces on the board.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.active.iter().map(move |&id| self.piece(id))
    }

    /// Candidate moves of the piece on `square`, empty unless its owner is on turn.
    pub fn moves_from(&self, square: Square) -> &[Move] {
        match self.piece_at(square) {
            Some(piece) if piece.color() == self.current_turn => piece.candidates(),
            _ => &[],
        }
    }

    /// Every candidate move of the side to move.
    pub fn candidates(&self) -> Vec<&Move> {
        self.pieces()
            .filter(|p| p.color() == self.current_turn)
            .flat_map(|p| p.candidates())
            .collect()
    }

    /// Captured pieces in capture order, optionally only those owned by `owner`.
    pub fn captured(&self, owner: Option<Color>) -> Vec<&Piece> {
        self.captured
            .iter()
            .map(|&id| self.piece(id))
            .filter(|p| owner.map_or(true, |c| p.color() == c))
            .collect()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether some `color` piece has a cached candidate move landing on `square`.
    ///
    /// During recomputation this only sees moves from rule phases that have
    /// already finished.
    pub fn is_targeted_by(&self, color: Color, square: Square) -> bool {
        self.pieces()
            .filter(|p| p.color() == color)
            .any(|p| p.candidates().iter().any(|m| m.to() == square))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Play the candidate move of the piece on `from` that lands on `to`.
    /// On error nothing changes.
    pub fn try_apply(&mut self, from: Square, to: Square) -> Result<&Move, MoveError> {
        let piece = self.piece_at(from).ok_or(MoveError::EmptySquare(from))?;
        if self.enforce_turn && piece.color() != self.current_turn {
            return Err(MoveError::NotYourTurn {
                square: from,
                color: piece.color(),
            });
        }
        let mv = piece
            .candidates()
            .iter()
            .find(|m| m.primary().piece == piece.id() && m.to() == to)
            .cloned()
            .ok_or(MoveError::NoCandidate { from, to })?;
        self.commit(mv);
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn apply(&mut self, from: Square, to: Square) -> bool {
        self.try_apply(from, to).is_ok()
    }

    /// Take back the last move, returning its record.
    pub fn try_undo(&mut self) -> Result<Move, MoveError> {
        let mv = self.history.pop().ok_or(MoveError::NothingToUndo)?;

        for &id in mv.captures.iter().rev() {
            if let Some(pos) = self.captured.iter().rposition(|&c| c == id) {
                self.captured.remove(pos);
                if let Err(at) = self.active.binary_search(&id) {
                    self.active.insert(at, id);
                }
            }
        }
        for d in mv.displacements.iter().rev() {
            let piece = &mut self.pieces[d.piece.0];
            piece.square = d.from;
            piece.history.pop();
        }

        self.current_turn = self.current_turn.opposite();
        self.recompute();
        Ok(mv)
    }

    pub fn undo(&mut self) -> bool {
        self.try_undo().is_ok()
    }

    fn commit(&mut self, mv: Move) {
        let ply = self.history.len();
        for d in &mv.displacements {
            let piece = &mut self.pieces[d.piece.0];
            piece.square = d.to;
            piece.history.push(ply);
        }
        for &id in &mv.captures {
            if let Some(pos) = self.active.iter().position(|&a| a == id) {
                self.active.remove(pos);
                self.captured.push(id);
            }
        }
        self.history.push(mv);
        self.current_turn = self.current_turn.opposite();
        self.recompute();
    }

    // -------------------------------------------------------------------------
    // Recomputation
    // -------------------------------------------------------------------------

    fn recompute(&mut self) {
        self.squares = [[None; 8]; 8];
        for &id in &self.active {
            let sq = self.pieces[id.0].square;
            self.squares[sq.rank.index()][sq.file.index()] = Some(id);
        }
        for piece in &mut self.pieces {
            piece.candidates.clear();
        }

        let rules = Arc::clone(&self.rules);
        for phase in RulePhase::ORDER {
            let mut staged: Vec<(PieceId, Vec<Move>)> = Vec::new();
            for rule in rules.in_phase(phase) {
                for piece in self.pieces().filter(|p| p.piece_type() == rule.piece_type()) {
                    let mut moves = Vec::new();
                    rule.run(piece, self, &mut moves);
                    moves.retain(|m| !m.displacements.is_empty());
                    staged.push((piece.id(), moves));
                }
            }
            for (id, moves) in staged {
                self.pieces[id.0].candidates.extend(moves);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn position(pieces: &[(PieceType, Color, &str)]) -> Board {
        let placements = pieces
            .iter()
            .map(|(pt, c, s)| Placement::new(pt.clone(), *c, sq(s)))
            .collect();
        Board::begin(GameConfig::empty().with_placements(placements)).unwrap()
    }

    /// Everything undo must restore, in comparable form.
    #[derive(PartialEq, Debug)]
    struct Fingerprint {
        active: Vec<(PieceId, Square, Vec<usize>)>,
        captured: Vec<PieceId>,
        squares: [[Option<PieceId>; 8]; 8],
        history: Vec<Move>,
        turn: Color,
        candidates: Vec<Vec<Move>>,
    }

    fn fingerprint(board: &Board) -> Fingerprint {
        Fingerprint {
            active: board.pieces().map(|p| (p.id(), p.square(), p.history().to_vec())).collect(),
            captured: board.captured.clone(),
            squares: board.squares,
            history: board.history.clone(),
            turn: board.turn(),
            candidates: board.pieces.iter().map(|p| p.candidates().to_vec()).collect(),
        }
    }

    fn assert_index_matches_pieces(board: &Board) {
        let mut seen = 0;
        for square in Square::all() {
            if let Some(id) = board.piece_id_at(square) {
                seen += 1;
                assert_eq!(board.piece(id).square(), square);
                assert!(board.active.contains(&id), "captured piece {id:?} still indexed");
            }
        }
        assert_eq!(seen, board.active.len(), "index and active pieces disagree");
        for id in &board.captured {
            assert!(!board.active.contains(id));
        }
        assert_eq!(board.active.len() + board.captured.len(), board.pieces.len());
    }

    #[test]
    fn opening_position() {
        let board = Board::new();
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.candidates().len(), 20);
        assert_eq!(board.occupant_at(sq("e1")), Some((&PieceType::King, Color::White)));
        assert_eq!(board.occupant_at(sq("d8")), Some((&PieceType::Queen, Color::Black)));
        assert_eq!(board.occupant_at(sq("e4")), None);
        assert_index_matches_pieces(&board);
    }

    /// Candidates are cached for both sides; the query shows only the mover's.
    #[test]
    fn moves_from_hides_the_opponents_moves() {
        let board = Board::new();
        assert!(board.moves_from(sq("e7")).is_empty());
        assert_eq!(board.piece_at(sq("e7")).unwrap().candidates().len(), 2);
        assert_eq!(board.moves_from(sq("e2")).len(), 2);
        assert!(board.moves_from(sq("e4")).is_empty());
    }

    /// Refused applies and an undo with no history leave every field as it was.
    #[test]
    fn failed_commands_change_nothing() {
        let mut board = Board::new();
        let before = fingerprint(&board);
        assert_eq!(board.try_apply(sq("e4"), sq("e5")).err(), Some(MoveError::EmptySquare(sq("e4"))));
        assert_eq!(
            board.try_apply(sq("e2"), sq("e5")).err(),
            Some(MoveError::NoCandidate { from: sq("e2"), to: sq("e5") })
        );
        assert_eq!(
            board.try_apply(sq("e7"), sq("e4")).err(),
            Some(MoveError::NoCandidate { from: sq("e7"), to: sq("e4") })
        );
        assert_eq!(board.try_undo().err(), Some(MoveError::NothingToUndo));
        assert!(!board.undo());
        assert_eq!(fingerprint(&board), before);
    }

    /// Black may move first on a default board; the move still passes the turn.
    #[test]
    fn apply_accepts_the_piece_not_on_turn() {
        let mut board = Board::new();
        assert_eq!(board.turn(), Color::White);
        assert!(board.apply(sq("e7"), sq("e5")));
        assert_eq!(board.occupant_at(sq("e5")), Some((&PieceType::Pawn, Color::Black)));
        assert_eq!(board.turn(), Color::Black);
        assert!(board.moves_from(sq("e2")).is_empty());
        assert_eq!(board.moves_from(sq("e5")).len(), 1);
        assert!(board.undo());
        assert_eq!(board.turn(), Color::White);
    }

    /// With strict turns the same move is refused and leaves the board untouched.
    #[test]
    fn strict_turns_refuse_the_other_side() {
        let mut board = Board::begin(GameConfig::new().enforce_turn(true)).unwrap();
        let before = fingerprint(&board);
        assert_eq!(
            board.try_apply(sq("e7"), sq("e5")).err(),
            Some(MoveError::NotYourTurn { square: sq("e7"), color: Color::Black })
        );
        assert_eq!(fingerprint(&board), before);
        assert!(board.apply(sq("e2"), sq("e4")));
        assert!(board.apply(sq("e7"), sq("e5")));
    }

    #[test]
    fn apply_moves_and_toggles_turn() {
        let mut board = Board::new();
        assert!(board.apply(sq("e2"), sq("e4")));
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.occupant_at(sq("e4")), Some((&PieceType::Pawn, Color::White)));
        assert_eq!(board.occupant_at(sq("e2")), None);
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.piece_at(sq("e4")).unwrap().history(), &[0]);
        assert!(board.apply(sq("d7"), sq("d5")));
        assert!(board.apply(sq("e4"), sq("d5")));
        assert_eq!(board.captured(None).len(), 1);
        assert_eq!(board.captured(Some(Color::Black)).len(), 1);
        assert!(board.captured(Some(Color::White)).is_empty());
        assert_index_matches_pieces(&board);

        assert!(board.undo());
        assert!(board.captured(None).is_empty());
        assert_eq!(board.occupant_at(sq("d5")), Some((&PieceType::Pawn, Color::Black)));
        assert_eq!(board.occupant_at(sq("e4")), Some((&PieceType::Pawn, Color::White)));
        assert_eq!(board.turn(), Color::White);
        assert_index_matches_pieces(&board);
    }

    /// The b4 pawn may take a4 en passant on the next ply only, and undoing the
    /// capture restores the victim.
    #[test]
    fn en_passant_only_right_after_the_double_step() {
        let mut board = position(&[
            (PieceType::King, Color::White, "h1"),
            (PieceType::Pawn, Color::White, "a2"),
            (PieceType::King, Color::Black, "h8"),
            (PieceType::Pawn, Color::Black, "b4"),
        ]);
        assert!(board.apply(sq("a2"), sq("a4")));
        let ep: Vec<&Move> = board.moves_from(sq("b4")).iter().filter(|m| m.to() == sq("a3")).collect();
        assert_eq!(ep.len(), 1);
        let victim = board.piece_id_at(sq("a4")).unwrap();
        assert_eq!(ep[0].captures, vec![victim]);

        let before = fingerprint(&board);
        assert!(board.apply(sq("b4"), sq("a3")));
        assert_eq!(board.occupant_at(sq("a4")), None);
        assert_eq!(board.captured(Some(Color::White)).len(), 1);
        assert!(board.undo());
        assert_eq!(fingerprint(&board), before);

        assert!(board.apply(sq("h8"), sq("g8")));
        assert!(board.apply(sq("h1"), sq("g1")));
        assert!(board.moves_from(sq("b4")).iter().all(|m| m.to() != sq("a3")));
    }

    fn castling_position() -> Board {
        position(&[
            (PieceType::King, Color::White, "e1"),
            (PieceType::Rook, Color::White, "a1"),
            (PieceType::Rook, Color::White, "h1"),
            (PieceType::King, Color::Black, "e8"),
            (PieceType::Pawn, Color::Black, "a7"),
        ])
    }

    fn castles(board: &Board) -> Vec<Square> {
        board
            .piece_at(sq("e1"))
            .map(|k| k.candidates().iter().filter(|m| m.displacements.len() == 2).map(Move::to).collect::<Vec<_>>())
            .unwrap_or_default()
    }

    /// Castling moves both pieces and counts for both; undo returns the rook to
    /// unmoved so castling is offered again.
    #[test]
    fn castling_moves_king_and_rook_and_undoes_symmetrically() {
        let mut board = castling_position();
        assert_eq!(castles(&board), vec![sq("g1"), sq("c1")]);
        let before = fingerprint(&board);

        assert!(board.apply(sq("e1"), sq("g1")));
        assert_eq!(board.occupant_at(sq("g1")), Some((&PieceType::King, Color::White)));
        assert_eq!(board.occupant_at(sq("f1")), Some((&PieceType::Rook, Color::White)));
        assert_eq!(board.occupant_at(sq("h1")), None);
        assert_eq!(board.piece_at(sq("f1")).unwrap().move_count(), 1);
        assert_index_matches_pieces(&board);

        assert!(board.undo());
        assert_eq!(fingerprint(&board), before);
        assert_eq!(board.piece_at(sq("h1")).unwrap().move_count(), 0);
        assert_eq!(castles(&board).len(), 2);
    }

    /// A rook move that is undone keeps castling; one that is played and reversed
    /// on the board loses it.
    #[test]
    fn rook_history_controls_castling() {
        let mut board = castling_position();
        assert!(board.apply(sq("h1"), sq("h2")));
        assert!(board.undo());
        assert_eq!(castles(&board).len(), 2);

        assert!(board.apply(sq("h1"), sq("h2")));
        assert!(board.apply(sq("a7"), sq("a6")));
        assert!(board.apply(sq("h2"), sq("h1")));
        assert!(board.apply(sq("a6"), sq("a5")));
        assert_eq!(board.piece_at(sq("h1")).unwrap().move_count(), 2);
        assert_eq!(castles(&board), vec![sq("c1")]);
    }

    #[test]
    fn custom_piece_types_need_a_rule() {
        let amazon = PieceType::custom("amazon").unwrap();
        let config = GameConfig::empty().with_placements(vec![Placement::new(amazon.clone(), Color::White, sq("d1"))]);
        assert_eq!(Board::begin(config).err(), Some(SetupError::MissingRule(amazon)));
    }

    #[test]
    fn overlapping_placements_are_rejected() {
        let config = GameConfig::new().with_placements(vec![Placement::new(PieceType::Queen, Color::White, sq("e2"))]);
        assert_eq!(Board::begin(config).err(), Some(SetupError::OccupiedSquare(sq("e2"))));
    }

    #[test]
    fn without_standard_rules_nothing_moves() {
        let board = Board::begin(GameConfig::new().include_standard(false).with_placements(vec![
            Placement::new(PieceType::Rook, Color::White, sq("a1")),
        ]))
        .unwrap();
        assert!(board.rules().is_empty());
        assert!(board.moves_from(sq("a1")).is_empty());
    }

    /// `first_turn` hands the opening move to black.
    #[test]
    fn resumed_games_start_with_the_given_turn() {
        let board = Board::begin(GameConfig::new().first_turn(Color::Black)).unwrap();
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.candidates().len(), 20);
        assert!(board.moves_from(sq("e2")).is_empty());
    }

    /// Seeded random games: every candidate at every ply must apply and undo back
    /// to the same state, and undoing the whole game gives the opening position.
    #[test]
    fn random_playouts_round_trip_every_candidate() {
        for seed in 0..4u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new();
            for _ in 0..60 {
                assert_index_matches_pieces(&board);
                let before = fingerprint(&board);
                let choices: Vec<(Square, Square)> = board.candidates().iter().map(|m| (m.from(), m.to())).collect();
                for &(from, to) in &choices {
                    assert!(board.apply(from, to), "{from}{to} should apply");
                    assert_index_matches_pieces(&board);
                    assert!(board.undo());
                    assert_eq!(fingerprint(&board), before, "{from}{to} did not round-trip");
                }
                let Some(&(from, to)) = choices.choose(&mut rng) else {
                    break;
                };
                assert!(board.apply(from, to));
            }
            while board.undo() {}
            assert_eq!(fingerprint(&board), fingerprint(&Board::new()));
        }
    }
}
