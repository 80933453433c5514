use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// A board coordinate. Row 0 = rank 1, col 0 = file a.
///
/// Both components are always in `0..8`; the only ways to build one are
/// [`Square::new`], [`Square::offset`] and algebraic parsing, all of which
/// check bounds. On the wire a square is its algebraic name (`"e4"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    rank: usize,
    file: usize,
}

impl Square {
    pub fn new(rank: usize, file: usize) -> Option<Square> {
        if rank < 8 && file < 8 {
            Some(Square { rank, file })
        } else {
            None
        }
    }

    pub fn rank(self) -> usize {
        self.rank
    }

    pub fn file(self) -> usize {
        self.file
    }

    /// Step by a signed delta, or `None` when that walks off the board.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Square> {
        let r = self.rank as i32 + dr;
        let c = self.file as i32 + dc;
        if (0..8).contains(&r) && (0..8).contains(&c) {
            Some(Square {
                rank: r as usize,
                file: c as usize,
            })
        } else {
            None
        }
    }

    /// a1 is dark; colors alternate from there.
    pub fn is_dark(self) -> bool {
        (self.rank + self.file) % 2 == 0
    }

    /// All 64 squares, rank by rank from a1.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square { rank, file }))
    }

    pub fn from_algebraic(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let (f, r) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return None;
        }
        Square::new((r - b'1') as usize, (f - b'a') as usize)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fc = (b'a' + self.file as u8) as char;
        let rc = (b'1' + self.rank as u8) as char;
        write!(f, "{fc}{rc}")
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
            .ok_or_else(|| ChessError::InvalidNotation(format!("bad square {s:?}")))
    }
}

impl TryFrom<String> for Square {
    type Error = ChessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> String {
        sq.to_string()
    }
}
