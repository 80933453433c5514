// =============================================================================
// Turn controller
//
// Owns the live board and everything derived from it. Every mutation runs the
// same sequence: validate, mutate, recompute check state / safe moves /
// status from scratch, append history, notify subscribers. Validation happens
// before anything is touched, so a rejected call leaves the game exactly as
// it was.
// =============================================================================

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attacks::CheckState;
use crate::board::{Board, CapturedPieces};
use crate::config::GameConfig;
use crate::error::{ChessError, IllegalReason, Result};
use crate::history::{History, HistoryEntry};
use crate::movegen::SafeMoveIndex;
use crate::moves::{Move, MoveRequest};
use crate::oracle::{OracleRequest, PositionTicket, Recommendation};
use crate::piece::{Color, PieceType};
use crate::promotion::{PendingPromotion, PromotionState};
use crate::square::Square;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Resigned { winner: Color },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(*winner),
            GameStatus::InProgress | GameStatus::Stalemate => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "In progress"),
            GameStatus::Checkmate { winner } => write!(f, "Checkmate, {winner} wins"),
            GameStatus::Stalemate => write!(f, "Stalemate"),
            GameStatus::Resigned { winner } => {
                write!(f, "{} resigned, {winner} wins", winner.opposite())
            }
        }
    }
}

/// Result of a move that was actually played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedMove {
    pub mv: Move,
    pub status: GameStatus,
    pub check: CheckState,
    /// Number of moves in the history after this one.
    pub ply: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    Applied(AppliedMove),
    /// The move reaches the last rank and needs a promotion kind; nothing was
    /// applied.
    PendingPromotion(PendingPromotion),
}

/// What subscribers see after each change of position or status.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub status: GameStatus,
    pub check: CheckState,
    pub last_move: Option<Move>,
    pub ticket: PositionTicket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl From<SubscriptionId> for u64 {
    fn from(id: SubscriptionId) -> u64 {
        id.0
    }
}

impl From<u64> for SubscriptionId {
    fn from(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}

type Subscriber = Box<dyn FnMut(&Snapshot)>;

pub struct Game {
    board: Board,
    status: GameStatus,
    check: CheckState,
    safe_moves: SafeMoveIndex,
    promotion: PromotionState,
    history: History,
    captured: CapturedPieces,
    restart_board: Board,
    epoch: u64,
    last_evaluation: Option<f64>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("fen", &self.board.to_fen())
            .field("status", &self.status)
            .field("promotion", &self.promotion)
            .field("ply", &self.history.len())
            .field("epoch", &self.epoch)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// A game from the standard initial position.
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// A game seeded from `board`. Restarting still goes to the standard
    /// initial position.
    pub fn from_board(board: Board) -> Self {
        let mut game = Game {
            history: History::new(board.clone()),
            board,
            status: GameStatus::InProgress,
            check: CheckState::default(),
            safe_moves: SafeMoveIndex::default(),
            promotion: PromotionState::Idle,
            captured: CapturedPieces::default(),
            restart_board: Board::new(),
            epoch: 0,
            last_evaluation: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        game.recompute();
        game
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::from_board(Board::from_fen(fen)?))
    }

    pub fn with_config(config: &GameConfig) -> Result<Self> {
        let mut game = Self::from_board(config.start_board()?);
        game.restart_board = config.restart_board()?;
        Ok(game)
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn check_state(&self) -> CheckState {
        self.check
    }

    pub fn safe_moves(&self) -> &SafeMoveIndex {
        &self.safe_moves
    }

    /// Legal destinations for the piece on `sq`. Empty while a promotion
    /// choice is outstanding, and for anything the side to move can't play.
    pub fn legal_destinations(&self, sq: Square) -> &[Square] {
        if self.promotion.is_pending() {
            return &[];
        }
        self.safe_moves.get(sq)
    }

    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.promotion.pending()
    }

    pub fn promotion_state(&self) -> PromotionState {
        self.promotion
    }

    pub fn captured(&self, color: Color) -> &[PieceType] {
        self.captured.lost_by(color)
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|e| e.mv)
    }

    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmove_number
    }

    pub fn position_as_notation(&self) -> String {
        self.board.to_fen()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_length(&self) -> usize {
        self.history.len()
    }

    /// The board as it stood right after the `index`-th move (0-based).
    pub fn replay_at(&self, index: usize) -> Option<&Board> {
        self.history.snapshot_at(index)
    }

    pub fn initial_board(&self) -> &Board {
        self.history.initial()
    }

    /// Evaluation score from the last recommendation whose move was applied.
    pub fn last_evaluation(&self) -> Option<f64> {
        self.last_evaluation
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    pub fn request_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<MoveOutcome> {
        if self.status.is_over() {
            return Err(ChessError::GameAlreadyOver(self.status));
        }

        let candidates = match self.candidates(from, to) {
            Ok(c) => c,
            Err(e) => {
                debug!(%from, %to, error = %e, "move rejected");
                return Err(e);
            }
        };
        let promotes = candidates.iter().any(|m| m.promotion.is_some());

        let mv = match (promotes, promotion) {
            (true, None) => {
                let pending = self.promotion.begin(from, to);
                debug!(%from, %to, "awaiting promotion choice");
                return Ok(MoveOutcome::PendingPromotion(pending));
            }
            (true, Some(kind)) => candidates.into_iter().find(|m| m.promotion == Some(kind)),
            (false, None) => candidates.into_iter().next(),
            (false, Some(_)) => None,
        };
        let mv = match mv {
            Some(mv) => mv,
            None => {
                debug!(%from, %to, ?promotion, "promotion rejected");
                return Err(ChessError::illegal(from, to, IllegalReason::InvalidPromotion));
            }
        };

        // Any different request supersedes a pending promotion.
        self.promotion.cancel();
        Ok(MoveOutcome::Applied(self.apply(mv)))
    }

    pub fn request(&mut self, req: MoveRequest) -> Result<MoveOutcome> {
        self.request_move(req.from, req.to, req.promotion)
    }

    /// Complete the pending promotion with `kind`. An unusable kind is
    /// rejected and the promotion stays pending.
    pub fn choose_promotion(&mut self, kind: PieceType) -> Result<AppliedMove> {
        let pending = self.promotion.pending().ok_or(ChessError::NoPendingPromotion)?;
        let mv = self
            .board
            .legal_moves(pending.from)
            .into_iter()
            .find(|m| m.to == pending.to && m.promotion == Some(kind))
            .ok_or_else(|| {
                ChessError::illegal(pending.from, pending.to, IllegalReason::InvalidPromotion)
            })?;

        self.promotion.cancel();
        Ok(self.apply(mv))
    }

    pub fn cancel_promotion(&mut self) -> Option<PendingPromotion> {
        let cancelled = self.promotion.cancel();
        if let Some(p) = cancelled {
            debug!(from = %p.from, to = %p.to, "promotion cancelled");
        }
        cancelled
    }

    pub fn resign(&mut self, color: Color) -> Result<GameStatus> {
        if self.status.is_over() {
            return Err(ChessError::GameAlreadyOver(self.status));
        }
        self.promotion.cancel();
        self.status = GameStatus::Resigned {
            winner: color.opposite(),
        };
        self.safe_moves = SafeMoveIndex::default();
        info!(loser = %color, status = %self.status, "resigned");
        self.publish();
        Ok(self.status)
    }

    /// Throw the current game away and start over. Any oracle answer for the
    /// old game becomes stale.
    pub fn restart(&mut self) {
        self.board = self.restart_board.clone();
        self.history = History::new(self.board.clone());
        self.captured.clear();
        self.promotion.cancel();
        self.last_evaluation = None;
        self.epoch += 1;
        self.recompute();
        info!(epoch = self.epoch, "game restarted");
        self.publish();
    }

    // -------------------------------------------------------------------------
    // Oracle
    // -------------------------------------------------------------------------

    pub fn ticket(&self) -> PositionTicket {
        PositionTicket {
            epoch: self.epoch,
            ply: self.history.len(),
        }
    }

    pub fn oracle_request(&self) -> OracleRequest {
        OracleRequest {
            fen: self.board.to_fen(),
            ticket: self.ticket(),
        }
    }

    /// Play the oracle's move, provided it answers the current position.
    pub fn apply_recommendation(
        &mut self,
        ticket: PositionTicket,
        rec: &Recommendation,
    ) -> Result<MoveOutcome> {
        let current = self.ticket();
        if ticket != current {
            warn!(?ticket, ?current, "discarding stale recommendation");
            return Err(ChessError::StaleRecommendation {
                expected: current,
                received: ticket,
            });
        }
        let outcome = self.request(rec.recommended_move)?;
        if let MoveOutcome::Applied(_) = outcome {
            self.last_evaluation = Some(rec.evaluation_score);
        }
        Ok(outcome)
    }

    // -------------------------------------------------------------------------
    // Subscribers
    // -------------------------------------------------------------------------

    /// Register a callback run synchronously after every applied move,
    /// resignation and restart.
    pub fn subscribe<F>(&mut self, on_snapshot: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(on_snapshot)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            status: self.status,
            check: self.check,
            last_move: self.last_move(),
            ticket: self.ticket(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Legal moves from `from` to `to` (several when promoting), or why there
    /// are none.
    fn candidates(&self, from: Square, to: Square) -> Result<Vec<Move>> {
        let piece = self
            .board
            .piece_at(from)
            .ok_or_else(|| ChessError::illegal(from, to, IllegalReason::EmptySquare))?;
        if piece.color != self.board.current_turn {
            return Err(ChessError::illegal(from, to, IllegalReason::WrongSide));
        }
        if !self.safe_moves.contains(from, to) {
            return Err(ChessError::illegal(from, to, IllegalReason::Unreachable));
        }
        Ok(self
            .board
            .legal_moves(from)
            .into_iter()
            .filter(|m| m.to == to)
            .collect())
    }

    fn apply(&mut self, mv: Move) -> AppliedMove {
        self.board.make_move(&mv);
        if let Some(victim) = mv.captured {
            self.captured.record(victim);
        }
        self.recompute();

        self.history.record(HistoryEntry {
            mv,
            status: self.status,
            board: self.board.clone(),
        });
        let ply = self.history.len();
        debug!(mv = %mv.to_uci(), ply, check = self.check.in_check, "move applied");
        if self.status.is_over() {
            info!(status = %self.status, ply, "game over");
        }

        self.publish();
        AppliedMove {
            mv,
            status: self.status,
            check: self.check,
            ply,
        }
    }

    /// Rebuild everything derived from the board for the side to move.
    fn recompute(&mut self) {
        let side = self.board.current_turn;
        self.check = self.board.check_state(side);
        self.safe_moves = self.board.all_legal_moves(side);
        self.status = if !self.safe_moves.is_empty() {
            GameStatus::InProgress
        } else if self.check.in_check {
            GameStatus::Checkmate {
                winner: side.opposite(),
            }
        } else {
            GameStatus::Stalemate
        };
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        for (_, on_snapshot) in self.subscribers.iter_mut() {
            on_snapshot(&snapshot);
        }
    }
}
