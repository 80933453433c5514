pub mod attacks;
pub mod board;
pub mod config;
pub mod error;
pub mod fen;
pub mod game;
pub mod history;
pub mod movegen;
pub mod moves;
pub mod oracle;
pub mod piece;
pub mod promotion;
pub mod square;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use attacks::CheckState;
pub use board::{Board, CapturedPieces, CastlingRights};
pub use config::GameConfig;
pub use error::{ChessError, IllegalReason, Result};
pub use fen::START_FEN;
pub use game::{AppliedMove, Game, GameStatus, MoveOutcome, Snapshot, SubscriptionId};
pub use history::{History, HistoryEntry};
pub use movegen::SafeMoveIndex;
pub use moves::{Move, MoveRequest};
pub use oracle::{OracleRequest, PositionTicket, Recommendation};
pub use piece::{promotion_choices, Color, Piece, PieceType};
pub use promotion::{PendingPromotion, PromotionState};
pub use square::Square;
