//! End-to-end rules scenarios driven through the public `Game` API.

use chess_game::{
    Board, ChessError, Color, Game, GameStatus, IllegalReason, MoveOutcome, Piece, PieceType,
    Square,
};

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

fn play(game: &mut Game, from: &str, to: &str) {
    match game.request_move(sq(from), sq(to), None) {
        Ok(MoveOutcome::Applied(_)) => {}
        other => panic!("{from}{to}: unexpected {other:?}"),
    }
}

// =============================================================================
// Game-over detection
// =============================================================================

#[test]
fn test_checkmate_queen_defended_by_king() {
    // Black king a8, white queen a7 defended by the king on b6.
    let game = Game::from_fen("k7/Q7/1K6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(game.check_state().in_check);
    assert!(game.safe_moves().is_empty());
    assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::White });
}

#[test]
fn test_undefended_queen_is_not_mate() {
    // With the white king on c7 the a7 queen hangs.
    let game = Game::from_fen("k7/Q1K5/8/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(game.check_state().in_check);
    assert_eq!(game.status(), GameStatus::InProgress);
    assert_eq!(game.legal_destinations(sq("a8")), &[sq("a7")]);
}

#[test]
fn test_checkmate_delivered_by_a_move() {
    let mut game = Game::from_fen("k7/7Q/1K6/8/8/8/8/8 w - - 0 1").unwrap();
    play(&mut game, "h7", "a7");
    assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::White });
    assert_eq!(game.check_state().king_square, Some(sq("a8")));
}

#[test]
fn test_stalemate_king_in_corner() {
    let game = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(!game.check_state().in_check);
    assert_eq!(game.status(), GameStatus::Stalemate);
    assert!(matches!(
        Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1")
            .unwrap()
            .request_move(sq("a8"), sq("b8"), None),
        Err(ChessError::GameAlreadyOver(GameStatus::Stalemate))
    ));
}

#[test]
fn test_stalemate_delivered_by_a_move() {
    let mut game = Game::from_fen("k7/2K5/8/1Q6/8/8/8/8 w - - 0 1").unwrap();
    play(&mut game, "b5", "b6");
    assert_eq!(game.status(), GameStatus::Stalemate);
}

#[test]
fn test_long_quiet_play_is_not_a_draw() {
    // The half-move clock is far past 100; only mate, stalemate and
    // resignation end a game.
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 150 90").unwrap();
    play(&mut game, "a1", "a2");
    assert_eq!(game.board().halfmove_clock, 151);
    assert_eq!(game.status(), GameStatus::InProgress);
}

// =============================================================================
// En passant
// =============================================================================

#[test]
fn test_en_passant_removes_the_passed_pawn() {
    let mut game = Game::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
    play(&mut game, "d7", "d5");
    assert_eq!(game.board().en_passant_target, Some(sq("d6")));
    assert!(game.legal_destinations(sq("e5")).contains(&sq("d6")));

    play(&mut game, "e5", "d6");
    let board = game.board();
    assert_eq!(board.piece_at(sq("d5")), None);
    assert_eq!(
        board.piece_at(sq("d6")),
        Some(Piece::new(PieceType::Pawn, Color::White))
    );
    let last = game.last_move().unwrap();
    assert!(last.is_en_passant);
    assert_eq!(last.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
    assert_eq!(game.captured(Color::Black), &[PieceType::Pawn]);
}

#[test]
fn test_en_passant_right_expires_after_one_move() {
    let mut game = Game::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
    play(&mut game, "d7", "d5");
    play(&mut game, "e1", "f1");
    play(&mut game, "e8", "f8");
    assert_eq!(game.board().en_passant_target, None);
    let err = game.request_move(sq("e5"), sq("d6"), None).unwrap_err();
    assert!(matches!(
        err,
        ChessError::IllegalMove { reason: IllegalReason::Unreachable, .. }
    ));
}

#[test]
fn test_en_passant_refused_when_it_exposes_the_king() {
    // Capturing would clear the fifth rank between the a5 rook and the h5 king.
    let game = Game::from_fen("8/8/8/r2pP2K/8/8/8/4k3 w - d6 0 2").unwrap();
    assert!(!game.legal_destinations(sq("e5")).contains(&sq("d6")));
}

// =============================================================================
// Promotion
// =============================================================================

#[test]
fn test_capture_promotion_two_step() {
    let mut game = Game::from_fen("3r2k1/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = game.board().clone();

    let outcome = game.request_move(sq("e7"), sq("d8"), None).unwrap();
    assert!(matches!(outcome, MoveOutcome::PendingPromotion(_)));
    assert_eq!(game.board(), &before);

    let applied = game.choose_promotion(PieceType::Rook).unwrap();
    assert_eq!(applied.mv.captured, Some(Piece::new(PieceType::Rook, Color::Black)));
    assert_eq!(
        game.board().piece_at(sq("d8")),
        Some(Piece::new(PieceType::Rook, Color::White))
    );
    assert_eq!(game.board().piece_at(sq("e7")), None);
    assert_eq!(game.history_length(), 1);
}

#[test]
fn test_black_promotes_on_first_rank() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/p7/4K3 b - - 0 1").unwrap();
    assert!(matches!(
        game.request_move(sq("a2"), sq("a1"), None),
        Ok(MoveOutcome::PendingPromotion(_))
    ));
    game.choose_promotion(PieceType::Queen).unwrap();
    assert_eq!(
        game.board().piece_at(sq("a1")),
        Some(Piece::new(PieceType::Queen, Color::Black))
    );
}

#[test]
fn test_ordinary_moves_never_enter_promotion() {
    let mut game = Game::new();
    for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
        play(&mut game, from, to);
        assert_eq!(game.pending_promotion(), None);
    }
    // A pawn one step short of the last rank does not trigger it either.
    let mut game = Game::from_fen("4k3/8/P7/8/8/8/8/4K3 w - - 0 1").unwrap();
    play(&mut game, "a6", "a7");
    assert_eq!(game.pending_promotion(), None);
}

#[test]
fn test_restart_cancels_pending_promotion() {
    let mut game = Game::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    game.request_move(sq("e7"), sq("e8"), None).unwrap();
    game.restart();
    assert_eq!(game.pending_promotion(), None);
    assert!(matches!(
        game.choose_promotion(PieceType::Queen),
        Err(ChessError::NoPendingPromotion)
    ));
    assert_eq!(game.board(), &Board::new());
}

// =============================================================================
// Castling
// =============================================================================

#[test]
fn test_castling_kingside_moves_both_pieces() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, "e1", "g1");
    let board = game.board();
    assert_eq!(board.piece_at(sq("g1")), Some(Piece::new(PieceType::King, Color::White)));
    assert_eq!(board.piece_at(sq("f1")), Some(Piece::new(PieceType::Rook, Color::White)));
    assert_eq!(board.piece_at(sq("h1")), None);
    assert!(game.last_move().unwrap().is_castle);
    assert!(!board.castling_rights.white_kingside);
    assert!(!board.castling_rights.white_queenside);
    assert!(board.castling_rights.black_kingside);
}

#[test]
fn test_rook_move_forfeits_right_even_after_returning() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, "h1", "h2");
    play(&mut game, "a8", "a7");
    play(&mut game, "h2", "h1");
    play(&mut game, "a7", "a8");

    let rights = game.board().castling_rights;
    assert!(!rights.white_kingside);
    assert!(rights.white_queenside);
    assert!(!rights.black_queenside);
    assert!(rights.black_kingside);
    assert!(!game.legal_destinations(sq("e1")).contains(&sq("g1")));
    assert!(game.legal_destinations(sq("e1")).contains(&sq("c1")));
}

#[test]
fn test_king_move_forfeits_both_rights() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, "e1", "e2");
    play(&mut game, "e8", "e7");
    play(&mut game, "e2", "e1");
    play(&mut game, "e7", "e8");
    assert_eq!(game.position_as_notation(), "r3k2r/8/8/8/8/8/8/R3K2R w - - 4 3");
    assert!(!game.legal_destinations(sq("e1")).contains(&sq("g1")));
    assert!(!game.legal_destinations(sq("e1")).contains(&sq("c1")));
}

#[test]
fn test_castling_rejected_through_or_into_attack() {
    // d1 is covered by the d8 rook: no queenside castling.
    let mut game = Game::from_fen("3rk3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let err = game.request_move(sq("e1"), sq("c1"), None).unwrap_err();
    assert!(matches!(
        err,
        ChessError::IllegalMove { reason: IllegalReason::Unreachable, .. }
    ));
    play(&mut game, "e1", "g1");

    // g1 is covered by the g8 rook: no kingside castling.
    let game = Game::from_fen("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    assert!(!game.legal_destinations(sq("e1")).contains(&sq("g1")));
    assert!(game.legal_destinations(sq("e1")).contains(&sq("c1")));
}

// =============================================================================
// History and replay
// =============================================================================

#[test]
fn test_replay_matches_boards_seen_live() {
    let mut game = Game::new();
    let mut observed = Vec::new();
    for (from, to) in [
        ("e2", "e4"),
        ("d7", "d5"),
        ("e4", "d5"),
        ("g8", "f6"),
        ("f1", "b5"),
        ("c7", "c6"),
        ("g1", "f3"),
        ("c6", "b5"),
        ("e1", "g1"),
    ] {
        play(&mut game, from, to);
        observed.push(game.board().clone());
    }

    let status = game.status();
    let len = game.history_length();
    for (i, board) in observed.iter().enumerate() {
        assert_eq!(game.replay_at(i), Some(board));
    }
    assert_eq!(game.replay_at(len), None);
    assert_eq!(game.initial_board(), &Board::new());
    assert_eq!(game.history_length(), len);
    assert_eq!(game.status(), status);
    assert_eq!(game.board(), observed.last().unwrap());
}

#[test]
fn test_history_entries_record_status() {
    let mut game = Game::new();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        play(&mut game, from, to);
    }
    let entries = game.history().entries();
    assert_eq!(entries.len(), 4);
    assert!(entries[..3].iter().all(|e| e.status == GameStatus::InProgress));
    assert_eq!(entries[3].status, GameStatus::Checkmate { winner: Color::Black });
    assert_eq!(entries[3].mv.to_uci(), "d8h4");
}
