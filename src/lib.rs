// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Stack & Conquer: scripted CPU opponents.
//!
//! This crate runs the move engine for computer players:
//! - One sandboxed Rhai script per CPU player
//! - Board state handed to the script as compact JSON
//! - Strict validation of the returned `[from, count, to]` move
//! - Structured failure reporting back to the game
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Opponent Controller (turns)     │
//! ├──────────────────┬──────────────────┤
//! │   Board Codec    │ Move Validator   │
//! ├──────────────────┴──────────────────┤
//! │     Script Host (rhai engine)       │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use stackconquer::{BoardLayout, BoardSnapshot, HostConfig, Opponent, OpponentEvent};
//!
//! let config = HostConfig::default();
//! let board = BoardSnapshot::empty(BoardLayout::from_config(&config), &config.pad_marker);
//!
//! let mut events: Vec<OpponentEvent> = Vec::new();
//! let mut cpu = Opponent::new(config);
//! cpu.load_source("demo", "fn makeMove(n) { [-1, 1, 80] }", &mut events)?;
//! let mv = cpu.request_move(&board, 25, &mut events)?;
//!
//! assert!(mv.is_placement());
//! assert_eq!(events, vec![OpponentEvent::MoveAccepted(mv)]);
//! # Ok::<(), stackconquer::ScriptError>(())
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod host;
pub mod opponent;
pub mod protocol;

pub use error::{ErrorKind, ScriptError, ScriptResult};

// Re-export key types at crate root for convenience
pub use board::{BoardLayout, BoardSnapshot};
pub use config::{BoardDimensions, ConfigError, HostConfig, PlayerId};
pub use host::ScriptHost;
pub use opponent::{EventSink, Opponent, OpponentEvent, ScriptFailure};
pub use protocol::{validate_move, ProposedMove, ENTRY_POINT, SENTINEL_FROM};
