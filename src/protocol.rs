//! Move protocol between the game and CPU scripts.
//!
//! A script's entry point must return `[from, count, to]`. The raw value is
//! decoded here, once, into a [`ProposedMove`] or a [`ScriptError`]; nothing
//! untyped leaves this module.

// Script integers are i64; moves are range-checked before narrowing.
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

use rhai::{Array, Dynamic, EvalAltResult, INT};
use serde::Serialize;

use crate::error::{eval_error_details, ScriptError, ScriptResult};

/// Name of the function every CPU script must define.
pub const ENTRY_POINT: &str = "makeMove";

/// `from` value meaning "place a new stone at `to`".
///
/// In-band in the script's return value; it is not a board index.
pub const SENTINEL_FROM: i32 = -1;

/// Raw result of calling a script's entry point.
pub type CallOutcome = Result<Dynamic, Box<EvalAltResult>>;

/// A structurally valid move returned by a script.
///
/// Only shape and bounds are checked; whether the move is legal is up to the
/// rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProposedMove {
    /// Source index, or [`SENTINEL_FROM`] to place a stone.
    pub from: i32,
    /// Number of stones moved (always > 0).
    pub count: i32,
    /// Destination index.
    pub to: i32,
}

impl ProposedMove {
    /// Create a move without validation.
    #[must_use]
    pub const fn new(from: i32, count: i32, to: i32) -> Self {
        Self { from, count, to }
    }

    /// Move that places one new stone at `to`.
    #[must_use]
    pub const fn place(to: i32) -> Self {
        Self::new(SENTINEL_FROM, 1, to)
    }

    /// Whether this places a new stone instead of moving a stack.
    #[must_use]
    pub const fn is_placement(&self) -> bool {
        self.from == SENTINEL_FROM
    }

    /// Source cell index, `None` for placements.
    #[must_use]
    pub fn source(&self) -> Option<usize> {
        usize::try_from(self.from).ok()
    }

    /// Destination cell index.
    #[must_use]
    pub fn destination(&self) -> usize {
        usize::try_from(self.to).unwrap_or_default()
    }

    /// Script-side representation (`[from, count, to]`).
    #[must_use]
    pub fn to_array(&self) -> Array {
        vec![
            Dynamic::from_int(INT::from(self.from)),
            Dynamic::from_int(INT::from(self.count)),
            Dynamic::from_int(INT::from(self.to)),
        ]
    }
}

impl fmt::Display for ProposedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.from, self.count, self.to)
    }
}

/// Validate the outcome of an entry-point call.
///
/// Checks run in order and the first failure wins:
/// 1. the call itself raised -> `Runtime`
/// 2. not an array of exactly three elements -> `MoveShape`
/// 3. an element is not a number -> `MoveType`
/// 4. `from`, `count` or `to` out of range for `board_len` -> `MoveRange`
///
/// # Errors
///
/// Returns the first failed check as a [`ScriptError`].
pub fn validate_move(outcome: CallOutcome, board_len: usize) -> ScriptResult<ProposedMove> {
    let value = outcome.map_err(|err| runtime_error(&err))?;
    decode_move(value, board_len)
}

/// Decode a returned value into a move (checks 2-4 of [`validate_move`]).
///
/// # Errors
///
/// Returns `MoveShape`, `MoveType` or `MoveRange`.
pub fn decode_move(value: Dynamic, board_len: usize) -> ScriptResult<ProposedMove> {
    let type_name = value.type_name();
    let Some(items) = value.try_cast::<Array>() else {
        return Err(ScriptError::MoveShape(format!(
            "expected [from, count, to], got {type_name}"
        )));
    };
    if items.len() != 3 {
        return Err(ScriptError::MoveShape(format!(
            "expected 3 elements, got {}",
            items.len()
        )));
    }

    let mut fields: [INT; 3] = [0; 3];
    for (idx, (slot, item)) in fields.iter_mut().zip(&items).enumerate() {
        *slot = numeric(item).ok_or_else(|| {
            ScriptError::MoveType(format!(
                "element {idx} is {}, expected a number",
                item.type_name()
            ))
        })?;
    }
    let [from, count, to] = fields;

    let len = INT::try_from(board_len).unwrap_or(INT::MAX);
    let on_board = |idx: INT| (0..len).contains(&idx);
    let from_ok = from == INT::from(SENTINEL_FROM) || on_board(from);
    let count_ok = count > 0 && count <= INT::from(i32::MAX);
    if !(from_ok && count_ok && on_board(to)) {
        return Err(ScriptError::MoveRange {
            from,
            count,
            to,
            board_len,
        });
    }

    // All three are now within i32 range (board indices are bounded by len).
    Ok(ProposedMove::new(from as i32, count as i32, to as i32))
}

/// Integer value of a script number; floats are truncated toward zero.
fn numeric(value: &Dynamic) -> Option<INT> {
    if let Ok(int) = value.as_int() {
        return Some(int);
    }
    value
        .as_float()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as INT)
}

/// Map an entry-point failure to `Runtime`, keeping the innermost line.
pub(crate) fn runtime_error(err: &EvalAltResult) -> ScriptError {
    let (line, message) = eval_error_details(err);
    ScriptError::Runtime {
        name: ENTRY_POINT,
        line,
        message,
    }
}
