//! Opponent controller: one script request per CPU turn.
//!
//! A turn runs `Idle -> Requesting -> Validating -> Idle`. The outcome is
//! both returned and emitted to an [`EventSink`]:
//! - accepted: [`OpponentEvent::MoveAccepted`]
//! - rejected: [`OpponentEvent::ScriptError`], and no move is applied
//!
//! A rejected turn leaves the host loaded, so the caller may retry.

use std::fmt;
use std::path::Path;
use std::sync::mpsc::Sender;

use serde::Serialize;
use tracing::{debug_span, error, info, warn};

use crate::board::BoardSnapshot;
use crate::config::{HostConfig, PlayerId};
use crate::error::{ErrorKind, ScriptError, ScriptResult};
use crate::host::ScriptHost;
use crate::protocol::{validate_move, ProposedMove};

/// Diagnostic details of a script failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFailure {
    /// Player whose script failed.
    pub player_id: PlayerId,
    /// Failure class.
    pub kind: ErrorKind,
    /// Script line, when known.
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl ScriptFailure {
    /// Describe `err` for `player_id`.
    #[must_use]
    pub fn new(player_id: PlayerId, err: &ScriptError) -> Self {
        Self {
            player_id,
            kind: err.kind(),
            line: err.line(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ScriptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU {} {}", self.player_id, self.kind)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Event delivered to the game controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OpponentEvent {
    /// The script produced a well-formed move.
    MoveAccepted(ProposedMove),
    /// Loading or running the script failed.
    ScriptError(ScriptFailure),
}

/// Receiver of opponent events.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: OpponentEvent);
}

impl EventSink for Vec<OpponentEvent> {
    fn emit(&mut self, event: OpponentEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<OpponentEvent> {
    fn emit(&mut self, event: OpponentEvent) {
        if let Err(err) = self.send(event) {
            warn!(event = ?err.0, "opponent event dropped, receiver gone");
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: OpponentEvent) {
        (**self).emit(event);
    }
}

/// CPU opponent driven by a script.
#[derive(Debug)]
pub struct Opponent {
    host: ScriptHost,
}

impl Opponent {
    /// Create an opponent with no script loaded.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self {
            host: ScriptHost::new(config),
        }
    }

    /// Player this opponent plays for.
    #[must_use]
    pub fn player_id(&self) -> PlayerId {
        self.host.player_id()
    }

    /// Whether a script is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.host.is_ready()
    }

    /// The underlying script host.
    #[must_use]
    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    /// Load a script file, reporting failures to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the load failure; the opponent is not ready afterwards.
    pub fn load_script(
        &mut self,
        path: impl AsRef<Path>,
        mut sink: impl EventSink,
    ) -> ScriptResult<()> {
        let result = self.host.load_script(path);
        self.finish_load(result, &mut sink)
    }

    /// Load script source, reporting failures to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the load failure; the opponent is not ready afterwards.
    pub fn load_source(
        &mut self,
        name: &str,
        source: &str,
        mut sink: impl EventSink,
    ) -> ScriptResult<()> {
        let result = self.host.load_source(name, source);
        self.finish_load(result, &mut sink)
    }

    /// Ask the script for a move given the number of possible moves.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` without running any script code if no script is
    /// loaded, otherwise the first validation failure.
    pub fn request_move(
        &mut self,
        board: &BoardSnapshot,
        possible_moves: usize,
        mut sink: impl EventSink,
    ) -> ScriptResult<ProposedMove> {
        self.run_turn(board, possible_moves, &[], &mut sink)
    }

    /// Ask the script for a move, publishing the legal moves to it.
    ///
    /// The script receives `legal_moves.len()` as its argument and can read
    /// the list with `legal_moves()`.
    ///
    /// # Errors
    ///
    /// Same as [`Opponent::request_move`].
    pub fn request_move_from(
        &mut self,
        board: &BoardSnapshot,
        legal_moves: &[ProposedMove],
        mut sink: impl EventSink,
    ) -> ScriptResult<ProposedMove> {
        self.run_turn(board, legal_moves.len(), legal_moves, &mut sink)
    }

    fn run_turn(
        &mut self,
        board: &BoardSnapshot,
        possible_moves: usize,
        legal_moves: &[ProposedMove],
        sink: &mut impl EventSink,
    ) -> ScriptResult<ProposedMove> {
        let player = self.player_id();
        let _span = debug_span!("cpu_turn", player).entered();

        let result = self
            .host
            .call_entry_point(board, possible_moves, legal_moves)
            .and_then(|outcome| validate_move(outcome, board.len()));

        match result {
            Ok(mv) => {
                info!(player, %mv, "CPU move accepted");
                sink.emit(OpponentEvent::MoveAccepted(mv));
                Ok(mv)
            }
            Err(err) => {
                self.report(&err, sink);
                Err(err)
            }
        }
    }

    fn finish_load(
        &self,
        result: ScriptResult<()>,
        sink: &mut impl EventSink,
    ) -> ScriptResult<()> {
        match result {
            Ok(()) => {
                info!(
                    player = self.player_id(),
                    script = self.host.script_name().unwrap_or_default(),
                    "CPU script ready"
                );
                Ok(())
            }
            Err(err) => {
                self.report(&err, sink);
                Err(err)
            }
        }
    }

    fn report(&self, err: &ScriptError, sink: &mut impl EventSink) {
        let failure = ScriptFailure::new(self.player_id(), err);
        error!(
            player = failure.player_id,
            kind = %failure.kind,
            line = ?failure.line,
            "CPU script error: {}",
            failure.message
        );
        sink.emit(OpponentEvent::ScriptError(failure));
    }
}
