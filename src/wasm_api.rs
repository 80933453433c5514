use crate::board::Board;
use crate::error::{ChessError, IllegalReason};
use crate::game::{Game, MoveOutcome, SubscriptionId};
use crate::oracle::{PositionTicket, Recommendation};
use crate::piece::{Color, PieceType};
use crate::square::Square;
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    fen: String,
    current_turn: String,
    game_over: bool,
    result: Option<String>,
    is_in_check: bool,
    check_square: Option<[usize; 2]>,
    captured_white: Vec<String>,
    captured_black: Vec<String>,
    last_move: Option<[[usize; 2]; 2]>,
    pending_promotion: Option<[[usize; 2]; 2]>,
    history_length: usize,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    pending: bool,
    error: Option<String>,
}

fn string_to_color(s: &str) -> Option<Color> {
    match s {
        "White" => Some(Color::White),
        "Black" => Some(Color::Black),
        _ => None,
    }
}

fn coords(sq: Square) -> [usize; 2] {
    [sq.rank(), sq.file()]
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn board_squares(board: &Board) -> Vec<Vec<Option<SquarePiece>>> {
    (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    board.squares[r][c].map(|p| SquarePiece {
                        piece_type: p.piece_type.name().to_string(),
                        color: p.color.to_string(),
                    })
                })
                .collect()
        })
        .collect()
}

fn build_board_state(game: &Game) -> BoardState {
    let check = game.check_state();
    BoardState {
        squares: board_squares(game.board()),
        fen: game.position_as_notation(),
        current_turn: game.side_to_move().to_string(),
        game_over: game.is_game_over(),
        result: game.is_game_over().then(|| game.status().to_string()),
        is_in_check: check.in_check,
        check_square: check.king_square.map(coords),
        captured_white: game.captured(Color::White).iter().map(|pt| pt.name().to_string()).collect(),
        captured_black: game.captured(Color::Black).iter().map(|pt| pt.name().to_string()).collect(),
        last_move: game.last_move().map(|m| [coords(m.from), coords(m.to)]),
        pending_promotion: game.pending_promotion().map(|p| [coords(p.from), coords(p.to)]),
        history_length: game.history_length(),
    }
}

fn error_result(err: &ChessError) -> JsValue {
    to_js(&MoveResult {
        board_state: None,
        pending: false,
        error: Some(err.to_string()),
    })
}

fn outcome_result(game: &Game, outcome: Result<MoveOutcome, ChessError>) -> JsValue {
    match outcome {
        Ok(o) => to_js(&MoveResult {
            board_state: Some(build_board_state(game)),
            pending: matches!(o, MoveOutcome::PendingPromotion(_)),
            error: None,
        }),
        Err(e) => error_result(&e),
    }
}

fn square(row: usize, col: usize) -> Result<Square, JsValue> {
    Square::new(row, col).ok_or_else(|| JsValue::from_str("square out of range"))
}

#[wasm_bindgen(js_name = Game)]
pub struct GameHandle {
    game: Game,
}

#[wasm_bindgen(js_class = Game)]
impl GameHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GameHandle {
        GameHandle { game: Game::new() }
    }

    pub fn from_fen(fen: &str) -> Result<GameHandle, JsValue> {
        Game::from_fen(fen)
            .map(|game| GameHandle { game })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game))
    }

    pub fn fen(&self) -> String {
        self.game.position_as_notation()
    }

    pub fn get_legal_destinations(&self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        let targets: Vec<[usize; 2]> = self
            .game
            .legal_destinations(square(row, col)?)
            .iter()
            .map(|s| coords(*s))
            .collect();
        Ok(to_js(&targets))
    }

    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        promotion: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let from = square(from_row, from_col)?;
        let to = square(to_row, to_col)?;
        let outcome = match promotion.as_deref().map(PieceType::from_name) {
            Some(None) => Err(ChessError::illegal(from, to, IllegalReason::InvalidPromotion)),
            Some(kind) => self.game.request_move(from, to, kind),
            None => self.game.request_move(from, to, None),
        };
        Ok(outcome_result(&self.game, outcome))
    }

    pub fn choose_promotion(&mut self, piece: &str) -> JsValue {
        let outcome = match PieceType::from_name(piece) {
            Some(pt) => self.game.choose_promotion(pt).map(MoveOutcome::Applied),
            None => match self.game.pending_promotion() {
                Some(p) => Err(ChessError::illegal(p.from, p.to, IllegalReason::InvalidPromotion)),
                None => Err(ChessError::NoPendingPromotion),
            },
        };
        outcome_result(&self.game, outcome)
    }

    pub fn cancel_promotion(&mut self) {
        self.game.cancel_promotion();
    }

    pub fn resign(&mut self, color: &str) -> JsValue {
        let outcome = match string_to_color(color) {
            Some(c) => self.game.resign(c).map(|_| ()),
            None => return JsValue::from_str("unknown color"),
        };
        match outcome {
            Ok(()) => self.get_board_state(),
            Err(e) => error_result(&e),
        }
    }

    pub fn restart(&mut self) -> JsValue {
        self.game.restart();
        self.get_board_state()
    }

    /// `callback` receives a snapshot object after every change. Returns an
    /// id for `unsubscribe`.
    pub fn subscribe(&mut self, callback: js_sys::Function) -> u64 {
        let id = self.game.subscribe(move |snapshot| {
            if let Err(e) = callback.call1(&JsValue::NULL, &to_js(snapshot)) {
                warn!(error = ?e, "snapshot subscriber threw");
            }
        });
        id.into()
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.game.unsubscribe(SubscriptionId::from(id))
    }

    pub fn oracle_request(&self) -> JsValue {
        to_js(&self.game.oracle_request())
    }

    /// Apply the oracle's JSON answer if `epoch`/`ply` still name the current
    /// position.
    pub fn apply_recommendation(&mut self, epoch: u64, ply: usize, response: &str) -> JsValue {
        let outcome = Recommendation::from_json(response)
            .and_then(|rec| self.game.apply_recommendation(PositionTicket { epoch, ply }, &rec));
        outcome_result(&self.game, outcome)
    }

    pub fn get_last_evaluation(&self) -> Option<f64> {
        self.game.last_evaluation()
    }

    pub fn history_length(&self) -> usize {
        self.game.history_length()
    }

    pub fn replay_at(&self, index: usize) -> JsValue {
        match self.game.replay_at(index) {
            Some(board) => to_js(&board_squares(board)),
            None => JsValue::NULL,
        }
    }
}
