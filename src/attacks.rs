use serde::Serialize;

use crate::board::Board;
use crate::piece::{Color, PieceType, DIAGONAL_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL_DIRS};
use crate::square::Square;

/// Check status of the side to move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckState {
    pub in_check: bool,
    /// Square of the checked king; `None` when not in check.
    pub king_square: Option<Square>,
}

impl Board {
    /// True if any piece of `attacker` could capture on `sq`. Scans outward
    /// from the target with each movement table instead of generating every
    /// attacker's moves.
    pub fn is_square_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        let holds = |target: Option<Square>, kinds: &[PieceType]| {
            target
                .and_then(|t| self.piece_at(t))
                .map(|p| p.color == attacker && kinds.contains(&p.piece_type))
                .unwrap_or(false)
        };

        // Check knight attacks
        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(sq.offset(dr, dc), &[PieceType::Knight]))
        {
            return true;
        }

        // Check king attacks
        if KING_OFFSETS
            .iter()
            .any(|&(dr, dc)| holds(sq.offset(dr, dc), &[PieceType::King]))
        {
            return true;
        }

        // A pawn on (row - pawn_dir, col ± 1) attacks (row, col)
        let pawn_row = -attacker.pawn_direction();
        if [-1, 1]
            .iter()
            .any(|&dc| holds(sq.offset(pawn_row, dc), &[PieceType::Pawn]))
        {
            return true;
        }

        // Check sliding pieces (rook/queen on straights, bishop/queen on diagonals)
        let rays = [
            (&ORTHOGONAL_DIRS, [PieceType::Rook, PieceType::Queen]),
            (&DIAGONAL_DIRS, [PieceType::Bishop, PieceType::Queen]),
        ];
        for (dirs, kinds) in rays {
            for &(dr, dc) in dirs {
                let mut cursor = sq.offset(dr, dc);
                while let Some(s) = cursor {
                    if self.piece_at(s).is_some() {
                        if holds(Some(s), &kinds) {
                            return true;
                        }
                        break;
                    }
                    cursor = s.offset(dr, dc);
                }
            }
        }

        false
    }

    /// A side without a king is never in check; that only happens on
    /// hand-built test boards.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.find_king(color)
            .map(|k| self.is_square_attacked_by(k, color.opposite()))
            .unwrap_or(false)
    }

    pub fn check_state(&self, color: Color) -> CheckState {
        match self.find_king(color) {
            Some(k) if self.is_square_attacked_by(k, color.opposite()) => CheckState {
                in_check: true,
                king_square: Some(k),
            },
            _ => CheckState::default(),
        }
    }

    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.pieces(color)
            .any(|(sq, _)| !self.legal_moves(sq).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn pawns_attack_diagonally_forward_only() {
        let b = board("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");
        assert!(b.is_square_attacked_by(sq("d5"), Color::White));
        assert!(b.is_square_attacked_by(sq("f5"), Color::White));
        assert!(!b.is_square_attacked_by(sq("e5"), Color::White));
        assert!(!b.is_square_attacked_by(sq("d3"), Color::White));

        let b = board("4k3/8/8/4p3/8/8/8/4K3 w - - 0 1");
        assert!(b.is_square_attacked_by(sq("d4"), Color::Black));
        assert!(!b.is_square_attacked_by(sq("d6"), Color::Black));
    }

    #[test]
    fn sliders_are_blocked_by_any_piece() {
        let b = board("4k3/8/8/8/r2P3K/8/8/8 w - - 0 1");
        assert!(b.is_square_attacked_by(sq("c4"), Color::Black));
        assert!(b.is_square_attacked_by(sq("d4"), Color::Black));
        assert!(!b.is_square_attacked_by(sq("e4"), Color::Black));
        assert!(!b.is_in_check(Color::White));
    }

    #[test]
    fn knights_and_kings_attack_their_offsets() {
        let b = board("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1");
        assert!(b.is_square_attacked_by(sq("c3"), Color::White));
        assert!(b.is_square_attacked_by(sq("d2"), Color::White));
        assert!(b.is_square_attacked_by(sq("f2"), Color::White));
        assert!(!b.is_square_attacked_by(sq("b3"), Color::White));
    }

    #[test]
    fn check_state_reports_king_square() {
        let b = board("k7/Q7/1K6/8/8/8/8/8 b - - 0 1");
        assert_eq!(
            b.check_state(Color::Black),
            CheckState {
                in_check: true,
                king_square: Some(sq("a8")),
            }
        );
        assert_eq!(b.check_state(Color::White), CheckState::default());
    }

    #[test]
    fn mate_and_stalemate_have_no_legal_moves() {
        let mate = board("k7/Q7/1K6/8/8/8/8/8 b - - 0 1");
        assert!(!mate.has_any_legal_move(Color::Black));
        assert!(mate.is_in_check(Color::Black));

        let stale = board("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert!(!stale.has_any_legal_move(Color::Black));
        assert!(!stale.is_in_check(Color::Black));

        assert!(Board::new().has_any_legal_move(Color::White));
    }
}
