//! Turn command implementation.

use super::output::format_text;
use super::{CliError, OutputFormat};
use stackconquer::{BoardLayout, BoardSnapshot, HostConfig, Opponent, OpponentEvent};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the turn command.
///
/// # Errors
///
/// Returns an error if the board can't be read or the script fails; script
/// failures are printed before returning.
pub(crate) fn execute(
    script: &Path,
    board: Option<PathBuf>,
    moves: Option<usize>,
    config: HostConfig,
    format: OutputFormat,
) -> Result<(), CliError> {
    let board = match board {
        Some(path) => {
            let text = fs::read_to_string(&path).map_err(|e| {
                CliError::new(format!("Failed to read {}: {e}", path.display()))
            })?;
            BoardSnapshot::from_json(&text).map_err(|e| {
                CliError::new(format!("Invalid board {}: {e}", path.display()))
            })?
        }
        None => BoardSnapshot::empty(BoardLayout::from_config(&config), &config.pad_marker),
    };
    let possible_moves =
        moves.unwrap_or_else(|| board.cells().iter().filter(|c| c.is_empty()).count());

    let mut events: Vec<OpponentEvent> = Vec::new();
    let mut opponent = Opponent::new(config);
    let result = opponent
        .load_script(script, &mut events)
        .and_then(|()| opponent.request_move(&board, possible_moves, &mut events));

    let name = script
        .file_name()
        .map_or_else(|| "script".to_string(), |n| n.to_string_lossy().to_string());
    match format {
        OutputFormat::Text => print!("{}", format_text(&events, &name)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&events)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    result.map(|_| ()).map_err(CliError::from)
}
