use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceType};
use crate::square::Square;

/// One ply, fully described. Built by the move generator, so `captured`,
/// `is_castle` and `is_en_passant` always agree with the board it came from.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub captured: Option<Piece>,
    pub is_castle: bool,
    pub is_en_passant: bool,
}

impl Move {
    pub fn quiet(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
            captured: None,
            is_castle: false,
            is_en_passant: false,
        }
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        MoveRequest::from(*self).to_uci()
    }
}

/// What a caller asks for: coordinates plus an optional promotion kind.
/// The engine resolves it against its legal moves.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    #[serde(default)]
    pub promotion: Option<PieceType>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceType) -> Self {
        self.promotion = Some(kind);
        self
    }

    pub fn to_uci(&self) -> String {
        let promo = match self.promotion {
            Some(PieceType::Queen) => "q",
            Some(PieceType::Rook) => "r",
            Some(PieceType::Bishop) => "b",
            Some(PieceType::Knight) => "n",
            _ => "",
        };
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse from UCI notation
    pub fn from_uci(s: &str) -> Option<MoveRequest> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceType::Queen),
            Some(b'r') => Some(PieceType::Rook),
            Some(b'b') => Some(PieceType::Bishop),
            Some(b'n') => Some(PieceType::Knight),
            Some(_) => return None,
        };
        Some(MoveRequest {
            from,
            to,
            promotion,
        })
    }
}

impl From<Move> for MoveRequest {
    fn from(m: Move) -> Self {
        MoveRequest {
            from: m.from,
            to: m.to,
            promotion: m.promotion,
        }
    }
}
