use serde::Serialize;

use crate::board::Board;
use crate::game::GameStatus;
use crate::moves::Move;

/// One applied ply and the position it produced. Entries own their board
/// outright, so nothing the live game does later can change them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub mv: Move,
    pub status: GameStatus,
    pub board: Board,
}

/// Append-only log of the current game, plus the position it started from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct History {
    initial: Board,
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new(initial: Board) -> Self {
        History {
            initial,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The position before the first move.
    pub fn initial(&self) -> &Board {
        &self.initial
    }

    /// The position after the `index`-th applied move (0-based).
    pub fn snapshot_at(&self, index: usize) -> Option<&Board> {
        self.entries.get(index).map(|e| &e.board)
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.entries.iter().map(|e| &e.mv)
    }
}
