//! Immutable configuration bound into a CPU script's environment.

use std::fs;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a player (1-based, as shown in tower digits).
pub type PlayerId = u8;

/// Size of the playable board area, without padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDimensions {
    /// Playable columns.
    pub width: u16,
    /// Playable rows.
    pub height: u16,
}

impl BoardDimensions {
    /// Create new board dimensions.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for BoardDimensions {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// Values a CPU script sees for the whole session.
///
/// Set once when the host is created. The host re-publishes these values
/// after loading a script and before every call, so a script can't change
/// them for later turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Player this script plays for.
    pub player_id: PlayerId,
    /// Number of players in the match.
    pub num_players: u8,
    /// Playable board size.
    pub dimensions: BoardDimensions,
    /// Tower height needed to win.
    pub win_height: u8,
    /// Marker for cells outside the playable shape.
    pub out_marker: String,
    /// Marker for padding cells around the board.
    pub pad_marker: String,
    /// Maximum script operations per evaluation (`None` = unbounded).
    ///
    /// Zero is rejected when parsing; a zero limit would read as "no limit".
    pub max_operations: Option<NonZeroU64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            player_id: 1,
            num_players: 2,
            dimensions: BoardDimensions::default(),
            win_height: 5,
            out_marker: "#".to_string(),
            pad_marker: "-".to_string(),
            max_operations: None,
        }
    }
}

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// File is not valid configuration JSON.
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl HostConfig {
    /// Configuration for the given player with default board settings.
    #[must_use]
    pub fn for_player(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
