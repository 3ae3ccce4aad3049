//! Output formatting utilities for CLI.

use stackconquer::{OpponentEvent, ProposedMove};

/// Format turn events as human-readable text.
pub(super) fn format_text(events: &[OpponentEvent], script_name: &str) -> String {
    let mut output = String::new();

    for event in events {
        match event {
            OpponentEvent::MoveAccepted(mv) => {
                output.push_str(&format!("Move from {script_name}: {mv}\n"));
                output.push_str(&format!("  {}\n", describe_move(mv)));
            }
            OpponentEvent::ScriptError(failure) => {
                output.push_str(&format!("Script error in {script_name}\n"));
                output.push_str(&format!("  Kind:    {}\n", failure.kind));
                if let Some(line) = failure.line {
                    output.push_str(&format!("  Line:    {line}\n"));
                }
                output.push_str(&format!("  Message: {}\n", failure.message));
            }
        }
    }

    output
}

fn describe_move(mv: &ProposedMove) -> String {
    match mv.source() {
        None => format!("place a stone on cell {}", mv.to),
        Some(from) => format!("move {} stone(s) from cell {from} to cell {}", mv.count, mv.to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackconquer::{ErrorKind, ScriptFailure};

    #[test]
    fn test_format_accepted() {
        let text = format_text(
            &[OpponentEvent::MoveAccepted(ProposedMove::new(3, 2, 7))],
            "cpu.rhai",
        );
        assert!(text.contains("Move from cpu.rhai: (3,2,7)"));
        assert!(text.contains("move 2 stone(s) from cell 3 to cell 7"));
    }

    #[test]
    fn test_format_failure() {
        let failure = ScriptFailure {
            player_id: 1,
            kind: ErrorKind::ScriptRuntimeError,
            line: Some(9),
            message: "boom".to_string(),
        };
        let text = format_text(&[OpponentEvent::ScriptError(failure)], "cpu.rhai");
        assert!(text.contains("ScriptRuntimeError"));
        assert!(text.contains("Line:    9"));
    }
}
