//! Error types for CPU scripts.

use std::fmt;
use std::path::PathBuf;

use rhai::EvalAltResult;
use serde::Serialize;
use thiserror::Error;

/// Failure class reported to the game controller.
///
/// The display names match the taxonomy shown to players in the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Script file could not be read.
    ScriptIOError,
    /// Script failed to compile or its top-level code raised.
    ScriptSyntaxError,
    /// Entry point missing or not callable with one argument.
    ScriptContractError,
    /// Entry point raised while producing a move.
    ScriptRuntimeError,
    /// Returned value is not an array of three elements.
    MoveShapeError,
    /// Returned array holds a non-numeric element.
    MoveTypeError,
    /// Returned move indexes outside the board or moves no stones.
    MoveRangeError,
    /// A move was requested before a script was loaded.
    NotReady,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors produced while loading or running a CPU script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script file could not be read.
    #[error("couldn't open script {}: {source}", .path.display())]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Compile or top-level evaluation failure.
    #[error("script error{}: {message}", at_line(.line))]
    Syntax {
        /// Line of the failure, when known.
        line: Option<usize>,
        /// Engine message.
        message: String,
    },
    /// Entry point missing or with the wrong arity.
    #[error("function {name}() {reason}")]
    Contract {
        /// Entry point name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Entry point call raised.
    #[error("error calling {name}(){}: {message}", at_line(.line))]
    Runtime {
        /// Entry point name.
        name: &'static str,
        /// Line of the failure, when known.
        line: Option<usize>,
        /// Engine message or thrown value.
        message: String,
    },
    /// Return value has the wrong shape.
    #[error("invalid return shape: {0}")]
    MoveShape(String),
    /// Return value has a non-numeric element.
    #[error("invalid return type: {0}")]
    MoveType(String),
    /// Return value is out of range for the board.
    #[error("invalid move {from}/{count}/{to} for board of {board_len} cells")]
    MoveRange {
        /// Source index as returned.
        from: i64,
        /// Stone count as returned.
        count: i64,
        /// Destination index as returned.
        to: i64,
        /// Number of cells on the board.
        board_len: usize,
    },
    /// No script is loaded.
    #[error("no CPU script loaded")]
    NotReady,
}

impl ScriptError {
    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::ScriptIOError,
            Self::Syntax { .. } => ErrorKind::ScriptSyntaxError,
            Self::Contract { .. } => ErrorKind::ScriptContractError,
            Self::Runtime { .. } => ErrorKind::ScriptRuntimeError,
            Self::MoveShape(_) => ErrorKind::MoveShapeError,
            Self::MoveType(_) => ErrorKind::MoveTypeError,
            Self::MoveRange { .. } => ErrorKind::MoveRangeError,
            Self::NotReady => ErrorKind::NotReady,
        }
    }

    /// Script line the error points at, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::Runtime { line, .. } => *line,
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

/// Line and message of the script error that actually raised.
///
/// Errors inside script functions arrive wrapped once per call frame; a
/// thrown value is reported as-is.
pub(crate) fn eval_error_details(err: &EvalAltResult) -> (Option<usize>, String) {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => eval_error_details(inner),
        EvalAltResult::ErrorRuntime(value, pos) => (pos.line(), value.to_string()),
        other => (other.position().line(), other.to_string()),
    }
}

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
