//! Board snapshots and their script-facing encoding.
//!
//! The game hands scripts the whole board, padding included, as a compact
//! JSON array of strings in row-major order. A cell holds one of:
//! - the padding marker (`"-"` by default) around the board
//! - the outside marker (`"#"` by default) for holes in the board shape
//! - `""` for an empty field
//! - the tower's stones bottom-to-top as player digits, e.g. `"122"`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BoardDimensions, HostConfig};

/// Geometry of the padded board.
///
/// The playable area is surrounded by `padding` cells on every side so that
/// scripts can step in any direction without bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    /// Playable area.
    pub dimensions: BoardDimensions,
    /// Padding cells on each side.
    pub padding: u16,
}

impl BoardLayout {
    /// Create a layout.
    #[must_use]
    pub const fn new(dimensions: BoardDimensions, padding: u16) -> Self {
        Self {
            dimensions,
            padding,
        }
    }

    /// Layout used by the game for a configuration (padding = win height).
    #[must_use]
    pub fn from_config(config: &HostConfig) -> Self {
        Self::new(config.dimensions, u16::from(config.win_height))
    }

    /// Row stride including padding.
    #[must_use]
    pub fn padded_width(&self) -> usize {
        usize::from(self.dimensions.width) + 2 * usize::from(self.padding)
    }

    /// Number of rows including padding.
    #[must_use]
    pub fn padded_height(&self) -> usize {
        usize::from(self.dimensions.height) + 2 * usize::from(self.padding)
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.padded_width() * self.padded_height()
    }

    /// Whether the layout has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot index of a playable coordinate.
    ///
    /// Returns `None` outside the playable area.
    #[must_use]
    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let pad = usize::from(self.padding);
        Some((usize::from(y) + pad) * self.padded_width() + usize::from(x) + pad)
    }
}

/// Board state handed to a script for one turn.
///
/// Owned by the rules engine; the opponent engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot {
    cells: Vec<String>,
}

impl BoardSnapshot {
    /// Wrap row-major cells.
    #[must_use]
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Board with padding and all playable fields empty.
    #[must_use]
    pub fn empty(layout: BoardLayout, pad_marker: &str) -> Self {
        let mut cells = vec![pad_marker.to_string(); layout.len()];
        for y in 0..layout.dimensions.height {
            for x in 0..layout.dimensions.width {
                if let Some(idx) = layout.index(x, y) {
                    cells[idx].clear();
                }
            }
        }
        Self { cells }
    }

    /// Decode a board from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a JSON array of strings.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the board has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at `idx`.
    #[must_use]
    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }

    /// Replace the cell at `idx`. Out-of-range indices are ignored.
    pub fn set(&mut self, idx: usize, value: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(idx) {
            *cell = value.into();
        }
    }

    /// Encode as compact JSON text.
    ///
    /// Equal snapshots always produce identical bytes.
    #[must_use]
    pub fn encode(&self) -> String {
        Value::Array(self.cells.iter().cloned().map(Value::String).collect()).to_string()
    }
}

impl From<Vec<String>> for BoardSnapshot {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> BoardLayout {
        BoardLayout::new(BoardDimensions::new(2, 2), 1)
    }

    #[test]
    fn test_layout_sizes() {
        let layout = BoardLayout::from_config(&HostConfig::default());
        assert_eq!(layout.padded_width(), 15);
        assert_eq!(layout.padded_height(), 15);
        assert_eq!(layout.len(), 225);
        assert_eq!(layout.index(0, 0), Some(80));
        assert_eq!(layout.index(4, 4), Some(144));
        assert_eq!(layout.index(5, 0), None);
    }

    #[test]
    fn test_empty_board() {
        let board = BoardSnapshot::empty(small_layout(), "-");
        assert_eq!(board.len(), 16);
        assert_eq!(board.cell(0), Some("-"));
        assert_eq!(board.cell(5), Some(""));
        assert_eq!(board.cell(6), Some(""));
        assert_eq!(board.cell(9), Some(""));
        assert_eq!(board.cell(10), Some(""));
        assert_eq!(board.cell(15), Some("-"));
    }

    #[test]
    fn test_encode_compact() {
        let mut board = BoardSnapshot::empty(small_layout(), "-");
        board.set(5, "12");
        let text = board.encode();
        assert!(text.starts_with(r#"["-","-","-","-","-","12","","-""#));
        assert!(!text.contains(' '));
    }

    #[test]
    fn test_encode_escapes_markers() {
        let board = BoardSnapshot::new(vec!["\"".to_string(), "\\".to_string()]);
        assert_eq!(board.encode(), r#"["\"","\\"]"#);
    }

    #[test]
    fn test_json_round_trip() {
        let board = BoardSnapshot::new(vec!["1".into(), "".into(), "#".into()]);
        assert_eq!(BoardSnapshot::from_json(&board.encode()).unwrap(), board);
    }

    #[test]
    fn test_from_json_rejects_numbers() {
        assert!(BoardSnapshot::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_set_out_of_range_ignored() {
        let mut board = BoardSnapshot::new(vec![String::new()]);
        board.set(3, "1");
        assert_eq!(board.cells(), &[String::new()]);
    }
}
