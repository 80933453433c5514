use std::fmt;

use crate::game::GameStatus;
use crate::oracle::PositionTicket;
use crate::square::Square;

pub type Result<T, E = ChessError> = std::result::Result<T, E>;

/// Why a move request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IllegalReason {
    /// No piece on the origin square.
    EmptySquare,
    /// The piece on the origin square belongs to the side not to move.
    WrongSide,
    /// The destination is not among the piece's legal destinations.
    Unreachable,
    /// A promotion kind was supplied where none applies, or the kind is not
    /// one a pawn may become.
    InvalidPromotion,
}

impl fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalReason::EmptySquare => write!(f, "no piece on origin square"),
            IllegalReason::WrongSide => write!(f, "not that side's turn"),
            IllegalReason::Unreachable => write!(f, "destination is not a legal move"),
            IllegalReason::InvalidPromotion => write!(f, "invalid promotion"),
        }
    }
}

/// Domain errors. Every one of these is reported before any state changes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChessError {
    #[error("illegal move {from} -> {to}: {reason}")]
    IllegalMove {
        from: Square,
        to: Square,
        reason: IllegalReason,
    },

    #[error("game is already over: {0}")]
    GameAlreadyOver(GameStatus),

    #[error("no promotion is pending")]
    NoPendingPromotion,

    #[error("invalid FEN: {0}")]
    InvalidNotation(String),

    #[error("stale recommendation for {received:?}, current position is {expected:?}")]
    StaleRecommendation {
        expected: PositionTicket,
        received: PositionTicket,
    },

    #[error("malformed recommendation: {0}")]
    MalformedRecommendation(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ChessError {
    pub(crate) fn illegal(from: Square, to: Square, reason: IllegalReason) -> Self {
        ChessError::IllegalMove { from, to, reason }
    }
}
