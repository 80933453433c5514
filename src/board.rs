use serde::{Deserialize, Serialize};

use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drop the right tied to a rook home square, if `sq` is one. Called for
    /// both the origin and the destination of every move, which covers a rook
    /// leaving home as well as a rook being captured there.
    pub fn revoke_for_rook_square(&mut self, sq: Square) {
        match (sq.rank(), sq.file()) {
            (0, 0) => self.white_queenside = false,
            (0, 7) => self.white_kingside = false,
            (7, 0) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }
}

/// Pieces each side has lost, in capture order.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    pub white: Vec<PieceType>,
    pub black: Vec<PieceType>,
}

impl CapturedPieces {
    pub fn record(&mut self, piece: Piece) {
        match piece.color {
            Color::White => self.white.push(piece.piece_type),
            Color::Black => self.black.push(piece.piece_type),
        }
    }

    /// Pieces of `color` that have been taken off the board.
    pub fn lost_by(&self, color: Color) -> &[PieceType] {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn clear(&mut self) {
        self.white.clear();
        self.black.clear();
    }
}

/// Everything a FEN string describes, and nothing more.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
    pub current_turn: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            current_turn: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard initial position.
    pub fn new() -> Self {
        let mut board = Board::empty();

        // White pieces (rows 0-1), Black pieces (rows 6-7)
        for (col, &pt) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(pt, Color::White));
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[7][col] = Some(Piece::new(pt, Color::Black));
        }
        board.castling_rights = CastlingRights::ALL;
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank()][sq.file()]
    }

    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.rank()][sq.file()] = piece;
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.piece_type == PieceType::King)
            .map(|(sq, _)| sq)
    }

    /// Occupied squares of `color`, rank by rank from a1.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(p) if p.color == color => Some((sq, p)),
            _ => None,
        })
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.pieces(piece.color).filter(|(_, p)| *p == piece).count()
    }

    /// Apply a move produced by the move generator for this board. No legality
    /// checks happen here; the caller has already filtered.
    pub fn make_move(&mut self, m: &Move) {
        let piece = match self.piece_at(m.from) {
            Some(p) => p,
            None => return,
        };
        let is_pawn_move = piece.piece_type == PieceType::Pawn;
        let is_capture = m.captured.is_some();

        // The passed pawn sits beside the origin, not on the destination.
        if m.is_en_passant {
            if let Some(victim) = Square::new(m.from.rank(), m.to.file()) {
                self.set_piece(victim, None);
            }
        }

        // Move the piece, substituting the promotion kind if there is one.
        let placed = match m.promotion {
            Some(kind) => Piece::new(kind, piece.color),
            None => piece,
        };
        self.set_piece(m.to, Some(placed));
        self.set_piece(m.from, None);

        // Castling moves the rook as part of the same ply.
        if m.is_castle {
            let row = m.from.rank();
            let (rook_from, rook_to) = if m.to.file() > m.from.file() {
                (7, 5)
            } else {
                (0, 3)
            };
            self.squares[row][rook_to] = self.squares[row][rook_from];
            self.squares[row][rook_from] = None;
        }

        // Update castling rights
        if piece.piece_type == PieceType::King {
            self.castling_rights.revoke_all(piece.color);
        }
        self.castling_rights.revoke_for_rook_square(m.from);
        self.castling_rights.revoke_for_rook_square(m.to);

        // Update en passant target
        let double_step = is_pawn_move && m.from.rank().abs_diff(m.to.rank()) == 2;
        self.en_passant_target = if double_step {
            Square::new((m.from.rank() + m.to.rank()) / 2, m.from.file())
        } else {
            None
        };

        // Update halfmove clock
        if is_pawn_move || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        // Toggle turn
        if self.current_turn == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.current_turn = self.current_turn.opposite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn legal(board: &Board, from: &str, to: &str) -> Move {
        board
            .legal_moves(sq(from))
            .into_iter()
            .find(|m| m.to == sq(to))
            .unwrap_or_else(|| panic!("{from}{to} should be legal"))
    }

    #[test]
    fn initial_position_layout() {
        let board = Board::new();
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert_eq!(board.castling_rights, CastlingRights::ALL);
    }

    #[test]
    fn double_step_sets_target_and_next_move_clears_it() {
        let mut board = Board::new();
        board.make_move(&legal(&board, "e2", "e4"));
        assert_eq!(board.en_passant_target, Some(sq("e3")));
        assert_eq!(board.current_turn, Color::Black);
        assert_eq!(board.fullmove_number, 1);

        board.make_move(&legal(&board, "g8", "f6"));
        assert_eq!(board.en_passant_target, None);
        assert_eq!(board.fullmove_number, 2);
        assert_eq!(board.halfmove_clock, 1);
    }

    #[test]
    fn castling_relocates_the_rook() {
        let mut board = Board::empty();
        board.set_piece(sq("e1"), Some(Piece::new(PieceType::King, Color::White)));
        board.set_piece(sq("a1"), Some(Piece::new(PieceType::Rook, Color::White)));
        board.set_piece(sq("e8"), Some(Piece::new(PieceType::King, Color::Black)));
        board.castling_rights.white_queenside = true;

        let m = legal(&board, "e1", "c1");
        assert!(m.is_castle);
        board.make_move(&m);
        assert_eq!(
            board.piece_at(sq("d1")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(board.piece_at(sq("a1")), None);
        assert!(!board.castling_rights.white_queenside);
    }

    #[test]
    fn capturing_a_home_rook_revokes_that_right() {
        let mut board = Board::empty();
        board.set_piece(sq("e1"), Some(Piece::new(PieceType::King, Color::White)));
        board.set_piece(sq("e8"), Some(Piece::new(PieceType::King, Color::Black)));
        board.set_piece(sq("h8"), Some(Piece::new(PieceType::Rook, Color::Black)));
        board.set_piece(sq("h1"), Some(Piece::new(PieceType::Rook, Color::White)));
        board.castling_rights = CastlingRights {
            white_kingside: true,
            white_queenside: false,
            black_kingside: true,
            black_queenside: false,
        };

        let m = legal(&board, "h1", "h8");
        assert_eq!(m.captured, Some(Piece::new(PieceType::Rook, Color::Black)));
        board.make_move(&m);
        assert!(!board.castling_rights.black_kingside);
        assert!(!board.castling_rights.white_kingside);
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    fn clocks_stop_at_their_maximum() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 4294967295 4294967295").unwrap();
        let m = legal(&board, "e8", "d8");
        board.make_move(&m);
        assert_eq!(board.halfmove_clock, u32::MAX);
        assert_eq!(board.fullmove_number, u32::MAX);
    }

    #[test]
    fn captured_pieces_are_tallied_per_color() {
        let mut captured = CapturedPieces::default();
        captured.record(Piece::new(PieceType::Knight, Color::Black));
        captured.record(Piece::new(PieceType::Pawn, Color::White));
        captured.record(Piece::new(PieceType::Queen, Color::Black));
        assert_eq!(
            captured.lost_by(Color::Black),
            &[PieceType::Knight, PieceType::Queen]
        );
        assert_eq!(captured.lost_by(Color::White), &[PieceType::Pawn]);
        captured.clear();
        assert!(captured.lost_by(Color::Black).is_empty());
    }
}
