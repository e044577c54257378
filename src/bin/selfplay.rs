use chess_rules::board::Board;
use chess_rules::coord::Square;
use chess_rules::snapshot::BoardSnapshot;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const DEFAULT_PLIES: usize = 80;

/// Squares of every piece, which must match the board's square index.
fn occupied(board: &Board) -> Vec<Square> {
    let mut squares: Vec<Square> = board.pieces().map(|p| p.square()).collect();
    squares.sort();
    squares
}

fn main() {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let plies: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PLIES);

    eprintln!("selfplay seed={seed} plies={plies} (built {})", env!("BUILD_TIMESTAMP"));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::new();
    let mut move_count = 0;

    while move_count < plies {
        let choices: Vec<(Square, Square)> = board.candidates().iter().map(|m| (m.from(), m.to())).collect();
        let Some(&(from, to)) = choices.choose(&mut rng) else {
            break;
        };

        let before = occupied(&board);
        assert!(board.apply(from, to), "candidate {from}{to} was refused");
        assert!(board.undo(), "undo after {from}{to} failed");
        assert_eq!(occupied(&board), before, "{from}{to} did not round-trip");
        assert!(board.apply(from, to));

        let indexed = Square::all().filter(|&sq| board.piece_id_at(sq).is_some()).count();
        assert_eq!(indexed, board.pieces().count(), "square index out of sync after {from}{to}");

        move_count += 1;
    }

    let captured = board.captured(None).len();
    eprintln!("Stopped after {move_count} moves, {captured} pieces captured, {} to move", board.turn());

    match BoardSnapshot::new(&board).to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize snapshot: {e}"),
    }
}
