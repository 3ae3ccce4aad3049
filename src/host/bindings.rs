//! Environment bound into a CPU script.
//!
//! The configuration and the current board are scope constants, visible to
//! top-level code and to `makeMove`. The same values are also served by host
//! functions, alongside the board cells and legal moves.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rhai::{Array, Dynamic, Engine, ImmutableString, Scope, INT};
use tracing::debug;

use crate::config::HostConfig;
use crate::protocol::ProposedMove;

/// Per-turn data published to the script before each call.
#[derive(Debug, Default)]
pub(crate) struct TurnState {
    /// Encoded board (`jsboard`).
    pub(crate) board_text: ImmutableString,
    /// Board cells in row-major order.
    pub(crate) cells: Vec<String>,
    /// Legal moves supplied by the caller, if any.
    pub(crate) legal_moves: Vec<ProposedMove>,
}

pub(crate) fn read(turn: &RwLock<TurnState>) -> RwLockReadGuard<'_, TurnState> {
    turn.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(turn: &RwLock<TurnState>) -> RwLockWriteGuard<'_, TurnState> {
    turn.write().unwrap_or_else(PoisonError::into_inner)
}

/// Register the logging callables and environment accessors.
pub(super) fn register_host_functions(
    engine: &mut Engine,
    config: &HostConfig,
    turn: &Arc<RwLock<TurnState>>,
) {
    let player = config.player_id;

    // Logging
    engine.register_fn("log", move |msg: &str| debug!(player, "{msg}"));
    engine.on_print(move |text| debug!(player, "{text}"));
    engine.on_debug(move |text, _source, pos| debug!(player, line = ?pos.line(), "{text}"));

    // Configuration
    let id = INT::from(config.player_id);
    engine.register_fn("player_id", move || id);
    let players = INT::from(config.num_players);
    engine.register_fn("num_players", move || players);
    let width = INT::from(config.dimensions.width);
    engine.register_fn("board_width", move || width);
    let height = INT::from(config.dimensions.height);
    engine.register_fn("board_height", move || height);
    let win = INT::from(config.win_height);
    engine.register_fn("win_height", move || win);
    let out = ImmutableString::from(config.out_marker.as_str());
    engine.register_fn("out_marker", move || out.clone());
    let pad = ImmutableString::from(config.pad_marker.as_str());
    engine.register_fn("pad_marker", move || pad.clone());

    // Current turn
    let state = Arc::clone(turn);
    engine.register_fn("board", move || read(&state).board_text.clone());
    let state = Arc::clone(turn);
    engine.register_fn("board_cells", move || -> Array {
        read(&state)
            .cells
            .iter()
            .map(|cell| Dynamic::from(cell.clone()))
            .collect()
    });
    let state = Arc::clone(turn);
    engine.register_fn("legal_moves", move || -> Array {
        read(&state)
            .legal_moves
            .iter()
            .map(|mv| Dynamic::from_array(mv.to_array()))
            .collect()
    });
}

/// Reset the scope to the configuration constants and the current board.
///
/// Anything the script's top-level code defined is dropped.
pub(super) fn publish_constants(
    scope: &mut Scope<'static>,
    config: &HostConfig,
    board_text: ImmutableString,
) {
    scope.clear();
    scope
        .push_constant("nID", INT::from(config.player_id))
        .push_constant("nBoardDimensionsX", INT::from(config.dimensions.width))
        .push_constant("nBoardDimensionsY", INT::from(config.dimensions.height))
        .push_constant("nHeightTowerWin", INT::from(config.win_height))
        .push_constant("sOut", ImmutableString::from(config.out_marker.as_str()))
        .push_constant("sPad", ImmutableString::from(config.pad_marker.as_str()))
        .push_constant("jsboard", board_text);
}
