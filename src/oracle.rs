// =============================================================================
// Move-recommendation oracle contract
//
// The oracle is an outside service: it receives a FEN and eventually answers
// with a move and an evaluation score. The engine never waits on it. Each
// request carries a ticket naming the exact position it was asked about, and
// a response is only accepted while that ticket is still current, so an
// answer that arrives after a restart or after another move is discarded.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, Result};
use crate::moves::MoveRequest;

/// Identifies one position within one game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionTicket {
    /// Bumped on every restart.
    pub epoch: u64,
    /// Number of moves applied in that game when the ticket was issued.
    pub ply: usize,
}

/// What the collaborator sends to the oracle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OracleRequest {
    pub fen: String,
    pub ticket: PositionTicket,
}

/// The oracle's answer. The evaluation is opaque display data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_move: MoveRequest,
    pub evaluation_score: f64,
}

impl Recommendation {
    pub fn from_json(s: &str) -> Result<Recommendation> {
        serde_json::from_str(s).map_err(|e| ChessError::MalformedRecommendation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceType;
    use crate::square::Square;

    #[test]
    fn parses_oracle_json() {
        let r = Recommendation::from_json(
            r#"{"recommendedMove": {"from": "e7", "to": "e8", "promotion": "queen"}, "evaluationScore": -1.5}"#,
        )
        .unwrap();
        assert_eq!(r.recommended_move.from, Square::from_algebraic("e7").unwrap());
        assert_eq!(r.recommended_move.to, Square::from_algebraic("e8").unwrap());
        assert_eq!(r.recommended_move.promotion, Some(PieceType::Queen));
        assert_eq!(r.evaluation_score, -1.5);
    }

    #[test]
    fn promotion_is_optional() {
        let r = Recommendation::from_json(
            r#"{"recommendedMove": {"from": "g1", "to": "f3"}, "evaluationScore": 0.2}"#,
        )
        .unwrap();
        assert_eq!(r.recommended_move.promotion, None);
    }

    #[test]
    fn malformed_json_is_reported() {
        for bad in [
            "not json",
            r#"{"recommendedMove": {"from": "e9", "to": "e8"}, "evaluationScore": 0}"#,
            r#"{"recommendedMove": {"from": "e2", "to": "e4"}}"#,
        ] {
            assert!(matches!(
                Recommendation::from_json(bad),
                Err(ChessError::MalformedRecommendation(_))
            ));
        }
    }
}
