use crate::board::Board;
use crate::coord::Square;
use crate::snapshot::{BoardSnapshot, MoveSummary};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardSnapshot>,
    error: Option<String>,
}

fn parse_square(text: &str) -> Result<Square, String> {
    text.parse::<Square>().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub struct Game {
    board: Board,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game { board: Board::new() }
    }

    pub fn get_board_state(&self) -> JsValue {
        let state = BoardSnapshot::new(&self.board);
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    /// `from`/`to` are square names such as `"e2"`.
    pub fn make_move(&mut self, from: &str, to: &str) -> JsValue {
        let outcome = parse_square(from).and_then(|from| {
            let to = parse_square(to)?;
            self.board.try_apply(from, to).map(|_| ()).map_err(|e| e.to_string())
        });
        let result = match outcome {
            Ok(()) => MoveResult {
                board_state: Some(BoardSnapshot::new(&self.board)),
                error: None,
            },
            Err(error) => MoveResult {
                board_state: None,
                error: Some(error),
            },
        };
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn undo(&mut self) -> bool {
        self.board.undo()
    }

    pub fn get_legal_moves_for_square(&self, square: &str) -> JsValue {
        let moves: Vec<MoveSummary> = match parse_square(square) {
            Ok(sq) => self
                .board
                .moves_from(sq)
                .iter()
                .map(|m| MoveSummary::new(&self.board, m))
                .collect(),
            Err(_) => Vec::new(),
        };
        serde_wasm_bindgen::to_value(&moves).unwrap_or(JsValue::NULL)
    }

    pub fn build_timestamp() -> String {
        env!("BUILD_TIMESTAMP").to_string()
    }
}
