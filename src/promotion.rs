use serde::Serialize;

use crate::square::Square;

/// A pawn move to the last rank that is waiting for its promotion kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
}

/// `Idle -> AwaitingChoice -> Idle`. The board is never touched while a
/// choice is outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PromotionState {
    #[default]
    Idle,
    AwaitingChoice(PendingPromotion),
}

impl PromotionState {
    pub fn pending(&self) -> Option<PendingPromotion> {
        match self {
            PromotionState::Idle => None,
            PromotionState::AwaitingChoice(p) => Some(*p),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PromotionState::AwaitingChoice(_))
    }

    pub fn begin(&mut self, from: Square, to: Square) -> PendingPromotion {
        let pending = PendingPromotion { from, to };
        *self = PromotionState::AwaitingChoice(pending);
        pending
    }

    /// Drop any outstanding request, returning it if there was one.
    pub fn cancel(&mut self) -> Option<PendingPromotion> {
        std::mem::take(self).pending()
    }
}
