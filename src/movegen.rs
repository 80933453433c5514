// =============================================================================
// Move generation
//
// Two layers. pseudo_moves() turns each piece's movement capability into
// concrete moves on this board, respecting blockers and captures but not
// check. legal_moves() replays every candidate on a scratch copy and keeps
// only those that leave the mover's king unattacked, which is what enforces
// pins and check evasion.
// =============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Color, Movement, Piece, PieceType, KING_OFFSETS, PROMOTION_CHOICES};
use crate::square::Square;

/// Legal destinations per origin square for one side. Pieces with no legal
/// move have no entry. Destinations are ordered by file, then rank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SafeMoveIndex {
    destinations: BTreeMap<Square, Vec<Square>>,
}

impl SafeMoveIndex {
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut destinations: BTreeMap<Square, Vec<Square>> = BTreeMap::new();
        for m in moves {
            destinations.entry(m.from).or_default().push(m.to);
        }
        for targets in destinations.values_mut() {
            targets.sort_by_key(|sq| (sq.file(), sq.rank()));
            // Promotion variants share a destination.
            targets.dedup();
        }
        SafeMoveIndex { destinations }
    }

    /// Destinations for the piece on `from`; empty if it has none.
    pub fn get(&self, from: Square) -> &[Square] {
        self.destinations
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, from: Square, to: Square) -> bool {
        self.get(from).contains(&to)
    }

    /// True when no piece has a legal move.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Number of pieces with at least one legal move.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, &[Square])> {
        self.destinations.iter().map(|(sq, d)| (*sq, d.as_slice()))
    }
}

impl Board {
    /// Every move the piece on `from` could make, ignoring whether it exposes
    /// its own king. Empty for an empty square.
    pub fn pseudo_moves(&self, from: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        let piece = match self.piece_at(from) {
            Some(p) => p,
            None => return moves,
        };

        match piece.piece_type.movement() {
            Movement::Pawn => self.generate_pawn_moves(from, piece.color, &mut moves),
            Movement::Leaper(offsets) => {
                self.generate_leaper_moves(from, piece.color, offsets, &mut moves)
            }
            Movement::Slider(dirs) => self.generate_sliding_moves(from, piece.color, dirs, &mut moves),
            Movement::King => {
                self.generate_leaper_moves(from, piece.color, &KING_OFFSETS, &mut moves);
                self.generate_castling_moves(from, piece.color, &mut moves);
            }
        }

        moves
    }

    /// The subset of [`Board::pseudo_moves`] that keeps the mover's king safe.
    pub fn legal_moves(&self, from: Square) -> Vec<Move> {
        let color = match self.piece_at(from) {
            Some(p) => p.color,
            None => return Vec::new(),
        };
        self.pseudo_moves(from)
            .into_iter()
            .filter(|m| {
                let mut scratch = self.clone();
                scratch.make_move(m);
                !scratch.is_in_check(color)
            })
            .collect()
    }

    /// Every legal move for `color`, promotion variants included.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        self.pieces(color)
            .flat_map(|(sq, _)| self.legal_moves(sq))
            .collect()
    }

    pub fn all_legal_moves(&self, color: Color) -> SafeMoveIndex {
        SafeMoveIndex::from_moves(&self.legal_moves_for(color))
    }

    fn push_pawn_move(from: Square, to: Square, captured: Option<Piece>, color: Color, moves: &mut Vec<Move>) {
        let base = Move {
            captured,
            ..Move::quiet(from, to)
        };
        if to.rank() == color.promotion_rank() {
            for &pt in &PROMOTION_CHOICES {
                moves.push(Move {
                    promotion: Some(pt),
                    ..base
                });
            }
        } else {
            moves.push(base);
        }
    }

    fn generate_pawn_moves(&self, from: Square, color: Color, moves: &mut Vec<Move>) {
        let dir = color.pawn_direction();

        // Single push, then double push from the start rank
        if let Some(one) = from.offset(dir, 0) {
            if self.piece_at(one).is_none() {
                Self::push_pawn_move(from, one, None, color, moves);

                if from.rank() == color.pawn_start_rank() {
                    if let Some(two) = one.offset(dir, 0) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::quiet(from, two));
                        }
                    }
                }
            }
        }

        // Captures (including en passant)
        for dc in [-1, 1] {
            let to = match from.offset(dir, dc) {
                Some(sq) => sq,
                None => continue,
            };

            match self.piece_at(to) {
                Some(target) if target.color != color => {
                    Self::push_pawn_move(from, to, Some(target), color, moves);
                }
                Some(_) => {}
                None => {
                    if color != self.current_turn || self.en_passant_target != Some(to) {
                        continue;
                    }
                    let passed = Square::new(from.rank(), to.file()).and_then(|s| self.piece_at(s));
                    if let Some(victim) = passed {
                        if victim.color != color && victim.piece_type == PieceType::Pawn {
                            moves.push(Move {
                                captured: Some(victim),
                                is_en_passant: true,
                                ..Move::quiet(from, to)
                            });
                        }
                    }
                }
            }
        }
    }

    fn generate_leaper_moves(&self, from: Square, color: Color, offsets: &[(i32, i32)], moves: &mut Vec<Move>) {
        for &(dr, dc) in offsets {
            let to = match from.offset(dr, dc) {
                Some(sq) => sq,
                None => continue,
            };
            match self.piece_at(to) {
                Some(p) if p.color == color => {}
                captured => moves.push(Move {
                    captured,
                    ..Move::quiet(from, to)
                }),
            }
        }
    }

    fn generate_sliding_moves(&self, from: Square, color: Color, directions: &[(i32, i32)], moves: &mut Vec<Move>) {
        for &(dr, dc) in directions {
            let mut cursor = from.offset(dr, dc);
            while let Some(to) = cursor {
                if let Some(p) = self.piece_at(to) {
                    if p.color != color {
                        moves.push(Move {
                            captured: Some(p),
                            ..Move::quiet(from, to)
                        });
                    }
                    break;
                }
                moves.push(Move::quiet(from, to));
                cursor = to.offset(dr, dc);
            }
        }
    }

    fn generate_castling_moves(&self, from: Square, color: Color, moves: &mut Vec<Move>) {
        let back_rank = color.back_rank();
        if from.rank() != back_rank || from.file() != 4 {
            return;
        }

        // The king may not castle out of check
        if self.is_square_attacked_by(from, color.opposite()) {
            return;
        }

        let rook = Some(Piece::new(PieceType::Rook, color));
        let empty = |cols: &[usize]| cols.iter().all(|&c| self.squares[back_rank][c].is_none());
        let safe = |cols: &[usize]| {
            cols.iter().all(|&c| {
                Square::new(back_rank, c)
                    .map(|sq| !self.is_square_attacked_by(sq, color.opposite()))
                    .unwrap_or(false)
            })
        };

        // Kingside: f and g empty, king crosses f and lands on g
        if self.castling_rights.kingside(color)
            && self.squares[back_rank][7] == rook
            && empty(&[5, 6])
            && safe(&[5, 6])
        {
            if let Some(to) = Square::new(back_rank, 6) {
                moves.push(Move {
                    is_castle: true,
                    ..Move::quiet(from, to)
                });
            }
        }

        // Queenside: b, c and d empty, king crosses d and lands on c
        if self.castling_rights.queenside(color)
            && self.squares[back_rank][0] == rook
            && empty(&[1, 2, 3])
            && safe(&[3, 2])
        {
            if let Some(to) = Square::new(back_rank, 2) {
                moves.push(Move {
                    is_castle: true,
                    ..Move::quiet(from, to)
                });
            }
        }
    }
}
