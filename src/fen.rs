// =============================================================================
// FEN codec
//
// Six space-separated fields: placement (rank 8 down to rank 1, files a-h,
// empty runs as digits), side to move, castling rights, en-passant target,
// half-move clock, full-move number. from_fen() only accepts positions the
// engine can play from, so parsing a FEN and encoding it again is lossless.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use crate::board::{Board, CastlingRights};
use crate::error::{ChessError, Result};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn invalid(msg: impl Into<String>) -> ChessError {
    ChessError::InvalidNotation(msg.into())
}

impl Board {
    pub fn to_fen(&self) -> String {
        let side_to_move = match self.current_turn {
            Color::White => "w",
            Color::Black => "b",
        };
        let en_passant = self
            .en_passant_target
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            self.placement_field(),
            side_to_move,
            castling_field(&self.castling_rights),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn placement_field(&self) -> String {
        let mut out = String::new();
        for row in (0..8).rev() {
            let mut empty_count = 0u8;
            for col in 0..8 {
                match self.squares[row][col] {
                    Some(p) => {
                        if empty_count > 0 {
                            out.push(char::from(b'0' + empty_count));
                            empty_count = 0;
                        }
                        out.push(p.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                out.push(char::from(b'0' + empty_count));
            }
            if row > 0 {
                out.push('/');
            }
        }
        out
    }

    pub fn from_fen(fen: &str) -> Result<Board> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(invalid(format!("expected 6 fields, got {}", parts.len())));
        }

        let mut board = Board::empty();
        parse_placement(parts[0], &mut board)?;

        board.current_turn = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(invalid(format!("bad side to move {other:?}"))),
        };
        board.castling_rights = parse_castling(parts[2])?;
        board.en_passant_target = match parts[3] {
            "-" => None,
            s => Some(s.parse::<Square>()?),
        };
        if let (Some(half), Some(full)) = (parts.get(4), parts.get(5)) {
            board.halfmove_clock = half
                .parse()
                .map_err(|_| invalid(format!("bad half-move clock {half:?}")))?;
            board.fullmove_number = full
                .parse()
                .map_err(|_| invalid(format!("bad full-move number {full:?}")))?;
        }

        validate(&board)?;
        Ok(board)
    }
}

fn castling_field(rights: &CastlingRights) -> String {
    let mut s = String::new();
    if rights.white_kingside {
        s.push('K');
    }
    if rights.white_queenside {
        s.push('Q');
    }
    if rights.black_kingside {
        s.push('k');
    }
    if rights.black_queenside {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}

fn parse_placement(field: &str, board: &mut Board) -> Result<()> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, got {}", ranks.len())));
    }

    for (i, rank_str) in ranks.iter().enumerate() {
        let row = 7 - i;
        let mut col = 0usize;
        for ch in rank_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                // A run is 1-8; "0" or "9" never appears in a valid rank.
                if d == 0 || d > 8 {
                    return Err(invalid(format!("bad empty run {ch:?}")));
                }
                col += d as usize;
            } else {
                let piece = Piece::from_fen_char(ch)
                    .ok_or_else(|| invalid(format!("bad piece {ch:?}")))?;
                if col >= 8 {
                    return Err(invalid(format!("rank {} overflows", row + 1)));
                }
                board.squares[row][col] = Some(piece);
                col += 1;
            }
            if col > 8 {
                return Err(invalid(format!("rank {} overflows", row + 1)));
            }
        }
        if col != 8 {
            return Err(invalid(format!("rank {} has {col} files", row + 1)));
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights> {
    let mut rights = CastlingRights::NONE;
    if field == "-" {
        return Ok(rights);
    }
    // Canonical order only, each letter at most once.
    let mut last = None;
    for c in field.chars() {
        let order = "KQkq"
            .find(c)
            .ok_or_else(|| invalid(format!("bad castling flag {c:?}")))?;
        if last.is_some_and(|prev| order <= prev) {
            return Err(invalid(format!("castling field {field:?} is not canonical")));
        }
        last = Some(order);
        match c {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            _ => rights.black_queenside = true,
        }
    }
    Ok(rights)
}

/// Reject positions no game could reach or continue from.
fn validate(board: &Board) -> Result<()> {
    for color in [Color::White, Color::Black] {
        let kings = board.count(Piece::new(PieceType::King, color));
        if kings != 1 {
            return Err(invalid(format!("{color} has {kings} kings")));
        }
    }

    for col in 0..8 {
        for row in [0, 7] {
            if board.squares[row][col].is_some_and(|p| p.piece_type == PieceType::Pawn) {
                return Err(invalid("pawn on a back rank"));
            }
        }
    }

    let rights = board.castling_rights;
    for color in [Color::White, Color::Black] {
        let row = color.back_rank();
        let at = |col: usize| board.squares[row][col];
        let king_home = at(4) == Some(Piece::new(PieceType::King, color));
        let rook = Some(Piece::new(PieceType::Rook, color));
        if rights.kingside(color) && !(king_home && at(7) == rook) {
            return Err(invalid(format!("{color} kingside castling without king and rook")));
        }
        if rights.queenside(color) && !(king_home && at(0) == rook) {
            return Err(invalid(format!("{color} queenside castling without king and rook")));
        }
    }

    if let Some(ep) = board.en_passant_target {
        // The target sits behind a pawn of the side that just moved.
        let mover = board.current_turn.opposite();
        let expected_rank = match mover {
            Color::White => 2,
            Color::Black => 5,
        };
        let pawn_sq = ep.offset(mover.pawn_direction(), 0);
        let pawn_ok = pawn_sq
            .and_then(|s| board.piece_at(s))
            .is_some_and(|p| p == Piece::new(PieceType::Pawn, mover));
        if ep.rank() != expected_rank || !pawn_ok || board.piece_at(ep).is_some() {
            return Err(invalid(format!("impossible en-passant target {ep}")));
        }
    }

    if board.fullmove_number == 0 {
        return Err(invalid("full-move number starts at 1"));
    }

    if board.is_in_check(board.current_turn.opposite()) {
        return Err(invalid("side not to move is in check"));
    }

    Ok(())
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl FromStr for Board {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_encodes_to_standard_fen() {
        assert_eq!(Board::new().to_fen(), START_FEN);
        assert_eq!(Board::from_fen(START_FEN).unwrap(), Board::new());
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 12 40",
            "4k3/8/8/8/8/8/8/4K2R b K - 3 17",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen);
            assert_eq!(Board::from_fen(&board.to_fen()).unwrap(), board);
        }
    }

    #[test]
    fn four_field_fen_defaults_the_clocks() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
    }

    #[test]
    fn display_and_from_str_use_fen() {
        let board: Board = START_FEN.parse().unwrap();
        assert_eq!(board.to_string(), START_FEN);
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkx - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w QK - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
        ] {
            assert!(
                matches!(Board::from_fen(bad), Err(ChessError::InvalidNotation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unplayable_positions_are_rejected() {
        for bad in [
            // two white kings
            "4k3/8/8/8/8/8/8/3KK3 w - - 0 1",
            // no black king
            "8/8/8/8/8/8/8/4K3 w - - 0 1",
            // pawn on the last rank
            "P3k3/8/8/8/8/8/8/4K3 b - - 0 1",
            // castling right without the rook
            "4k3/8/8/8/8/8/8/4K3 w K - 0 1",
            // en-passant target with no pawn behind it
            "4k3/8/8/8/8/8/8/4K3 w - e6 0 1",
            // black to move while white is in check
            "4k3/8/8/8/8/8/8/r3K3 b - - 0 1",
        ] {
            assert!(Board::from_fen(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
