use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ChessError, Result};

/// Session settings, usually read from a TOML file.
///
/// ```toml
/// start_fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
/// restart_from_start_fen = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Position the first game starts from; the standard opening when absent.
    pub start_fen: Option<String>,
    /// When set, `restart()` returns to `start_fen` instead of the standard
    /// opening position.
    pub restart_from_start_fen: bool,
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<GameConfig> {
        let config: GameConfig =
            toml::from_str(s).map_err(|e| ChessError::InvalidConfig(e.to_string()))?;
        // Fail at load time rather than at the first restart.
        config.start_board()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<GameConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChessError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Board the first game is seeded with.
    pub fn start_board(&self) -> Result<Board> {
        match &self.start_fen {
            Some(fen) => Board::from_fen(fen),
            None => Ok(Board::new()),
        }
    }

    /// Board a restarted game is seeded with.
    pub fn restart_board(&self) -> Result<Board> {
        if self.restart_from_start_fen {
            self.start_board()
        } else {
            Ok(Board::new())
        }
    }
}
