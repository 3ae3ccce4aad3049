//! Script host for CPU opponents.
//!
//! Each CPU player gets its own [`ScriptHost`]: a Rhai engine, the compiled
//! script and the bound environment. Hosts share nothing, so hosts for
//! different players may live on different threads.
//!
//! Scripts see the configuration, the current board and a `log` function,
//! and must define `fn makeMove(possible_moves)` returning
//! `[from, count, to]`.

mod bindings;

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST, INT};
use tracing::{debug, info};

use crate::board::BoardSnapshot;
use crate::config::{HostConfig, PlayerId};
use crate::error::{eval_error_details, ScriptError, ScriptResult};
use crate::protocol::{CallOutcome, ProposedMove, ENTRY_POINT};

use bindings::TurnState;

/// One isolated script execution context.
pub struct ScriptHost {
    /// Immutable environment values.
    config: HostConfig,
    /// Rhai engine with host functions registered.
    engine: Engine,
    /// Scope holding the published constants.
    scope: Scope<'static>,
    /// Compiled script; `None` until a script loads successfully.
    ast: Option<AST>,
    /// Name of the loaded script (file path or caller-supplied name).
    script_name: Option<String>,
    /// Board and legal moves for the current turn, read by host functions.
    turn: Arc<RwLock<TurnState>>,
}

impl fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptHost")
            .field("player_id", &self.config.player_id)
            .field("script", &self.script_name)
            .field("ready", &self.ast.is_some())
            .finish_non_exhaustive()
    }
}

impl ScriptHost {
    /// Create a host with no script loaded.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        let turn = Arc::new(RwLock::new(TurnState::default()));

        let mut engine = Engine::new();
        if let Some(limit) = config.max_operations {
            engine.set_max_operations(limit.get());
        }
        bindings::register_host_functions(&mut engine, &config, &turn);

        let mut host = Self {
            config,
            engine,
            scope: Scope::new(),
            ast: None,
            script_name: None,
            turn,
        };
        host.publish_environment();
        host
    }

    /// Player this host plays for.
    #[must_use]
    pub fn player_id(&self) -> PlayerId {
        self.config.player_id
    }

    /// Environment bound into the script.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Whether a script is loaded and moves may be requested.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ast.is_some()
    }

    /// Name of the loaded script.
    #[must_use]
    pub fn script_name(&self) -> Option<&str> {
        self.script_name.as_deref()
    }

    /// Read, evaluate and check a script file.
    ///
    /// Any previously loaded script is dropped first, so a failed load leaves
    /// the host not ready.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be read, otherwise see
    /// [`ScriptHost::load_source`].
    pub fn load_script(&mut self, path: impl AsRef<Path>) -> ScriptResult<()> {
        self.unload();
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_source(&path.display().to_string(), &source)
    }

    /// Evaluate and check script source.
    ///
    /// # Errors
    ///
    /// Returns `Syntax` if the source fails to compile or its top-level code
    /// raises, and `Contract` if it doesn't define `makeMove` with one
    /// parameter.
    pub fn load_source(&mut self, name: &str, source: &str) -> ScriptResult<()> {
        self.unload();
        info!(player = self.config.player_id, script = name, "loading CPU script");

        let mut ast = self
            .engine
            .compile(source)
            .map_err(|err| ScriptError::Syntax {
                line: err.position().line(),
                message: err.err_type().to_string(),
            })?;
        ast.set_source(name);

        self.publish_environment();
        self.engine
            .run_ast_with_scope(&mut self.scope, &ast)
            .map_err(|err| {
                let (line, message) = eval_error_details(&err);
                ScriptError::Syntax { line, message }
            })?;

        check_entry_point(&ast)?;

        self.ast = Some(ast);
        self.script_name = Some(name.to_string());
        // Top-level code may have shadowed the constants.
        self.publish_environment();
        Ok(())
    }

    /// Drop the loaded script.
    pub fn unload(&mut self) {
        self.ast = None;
        self.script_name = None;
    }

    /// Publish the turn and call the entry point.
    ///
    /// `legal_moves` may be empty when the caller only knows the count.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` if no script is loaded. Script failures are part of
    /// the returned [`CallOutcome`].
    pub(crate) fn call_entry_point(
        &mut self,
        board: &BoardSnapshot,
        possible_moves: usize,
        legal_moves: &[ProposedMove],
    ) -> ScriptResult<CallOutcome> {
        if self.ast.is_none() {
            return Err(ScriptError::NotReady);
        }

        {
            let mut turn = bindings::write(&self.turn);
            turn.board_text = board.encode().into();
            turn.cells = board.cells().to_vec();
            turn.legal_moves = legal_moves.to_vec();
        }
        self.publish_environment();

        let Some(ast) = self.ast.as_ref() else {
            return Err(ScriptError::NotReady);
        };
        let count = INT::try_from(possible_moves).unwrap_or(INT::MAX);
        debug!(player = self.config.player_id, possible_moves, "calling {ENTRY_POINT}()");

        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        Ok(self
            .engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, ast, ENTRY_POINT, (count,)))
    }

    /// Re-assert the configuration constants and the current board.
    fn publish_environment(&mut self) {
        let board_text = bindings::read(&self.turn).board_text.clone();
        bindings::publish_constants(&mut self.scope, &self.config, board_text);
    }
}

/// Check that the script defines the entry point with one parameter.
fn check_entry_point(ast: &AST) -> ScriptResult<()> {
    let arities: Vec<usize> = ast
        .iter_functions()
        .filter(|f| f.name == ENTRY_POINT)
        .map(|f| f.params.len())
        .collect();

    if arities.contains(&1) {
        return Ok(());
    }
    let reason = if arities.is_empty() {
        "not found or not callable".to_string()
    } else {
        format!("must take exactly one parameter (found {arities:?})")
    };
    Err(ScriptError::Contract {
        name: ENTRY_POINT,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::validate_move;
    use std::num::NonZeroU64;

    fn host() -> ScriptHost {
        ScriptHost::new(HostConfig::default())
    }

    fn call(host: &mut ScriptHost, board: &BoardSnapshot) -> Dynamic {
        host.call_entry_point(board, 3, &[]).unwrap().unwrap()
    }

    fn board16() -> BoardSnapshot {
        BoardSnapshot::new(vec![String::new(); 16])
    }

    #[test]
    fn test_new_host_not_ready() {
        let mut host = host();
        assert!(!host.is_ready());
        let err = host.call_entry_point(&board16(), 1, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
    }

    #[test]
    fn test_load_and_call() {
        let mut host = host();
        host.load_source("test", "fn makeMove(n) { [-1, n, 5] }").unwrap();
        assert!(host.is_ready());
        assert_eq!(host.script_name(), Some("test"));

        let outcome = host.call_entry_point(&board16(), 2, &[]).unwrap();
        assert_eq!(validate_move(outcome, 16).unwrap(), ProposedMove::new(-1, 2, 5));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let mut host = host();
        let err = host
            .load_source("bad", "fn makeMove(n) {\n  let x = ;\n}\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptSyntaxError);
        assert_eq!(err.line(), Some(2));
        assert!(!host.is_ready());
    }

    #[test]
    fn test_top_level_throw_is_syntax_error() {
        let mut host = host();
        let err = host
            .load_source("bad", "fn makeMove(n) { [0, 1, 0] }\nthrow \"init failed\";\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptSyntaxError);
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("init failed"));
    }

    #[test]
    fn test_missing_entry_point() {
        let mut host = host();
        let err = host.load_source("bad", "fn other(n) { n }").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptContractError);
        assert!(!host.is_ready());
    }

    #[test]
    fn test_entry_point_wrong_arity() {
        let mut host = host();
        let err = host
            .load_source("bad", "fn makeMove() { [0, 1, 0] }")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptContractError);
        assert!(err.to_string().contains("one parameter"));
    }

    #[test]
    fn test_failed_reload_drops_previous_script() {
        let mut host = host();
        host.load_source("good", "fn makeMove(n) { [0, 1, 0] }").unwrap();
        assert!(host.is_ready());
        assert!(host.load_source("bad", "fn other() {}").is_err());
        assert!(!host.is_ready());
        assert_eq!(host.script_name(), None);
    }

    #[test]
    fn test_missing_file() {
        let mut host = host();
        let err = host.load_script("/nonexistent/cpu.rhai").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptIOError);
    }

    #[test]
    fn test_host_functions_expose_config() {
        let config = HostConfig {
            player_id: 2,
            win_height: 4,
            ..HostConfig::default()
        };
        let mut host = ScriptHost::new(config);
        host.load_source(
            "env",
            "fn makeMove(n) { [player_id(), win_height(), board_width() + board_height()] }",
        )
        .unwrap();
        let value = call(&mut host, &board16()).into_array().unwrap();
        assert_eq!(value[0].as_int().unwrap(), 2);
        assert_eq!(value[1].as_int().unwrap(), 4);
        assert_eq!(value[2].as_int().unwrap(), 10);
    }

    #[test]
    fn test_board_is_published_each_call() {
        let mut host = host();
        host.load_source("board", "fn makeMove(n) { board() }").unwrap();

        let mut board = board16();
        board.set(3, "12");
        let text = call(&mut host, &board).into_string().unwrap();
        assert_eq!(text, board.encode());

        board.set(3, "");
        let text = call(&mut host, &board).into_string().unwrap();
        assert_eq!(text, board.encode());
    }

    #[test]
    fn test_board_cells_and_legal_moves() {
        let mut host = host();
        host.load_source(
            "cells",
            "fn makeMove(n) { let cells = board_cells(); let m = legal_moves(); [cells[3], m.len(), m[0][2]] }",
        )
        .unwrap();
        let mut board = board16();
        board.set(3, "211");
        let outcome = host
            .call_entry_point(&board, 1, &[ProposedMove::place(9)])
            .unwrap();
        let value = outcome.unwrap().into_array().unwrap();
        assert_eq!(value[0].clone().into_string().unwrap(), "211");
        assert_eq!(value[1].as_int().unwrap(), 1);
        assert_eq!(value[2].as_int().unwrap(), 9);
    }

    #[test]
    fn test_constants_visible_to_top_level_code() {
        let mut host = host();
        host.load_source(
            "consts",
            "if nID != 1 || sPad != \"-\" { throw \"bad env\"; }\nfn makeMove(n) { [0, 1, 0] }",
        )
        .unwrap();
        assert!(host.is_ready());
    }

    #[test]
    fn test_top_level_shadowing_does_not_persist() {
        let mut host = host();
        host.load_source("shadow", "let nID = 99;\nfn makeMove(n) { [0, 1, 0] }")
            .unwrap();
        assert_eq!(host.scope.get_value::<INT>("nID"), Some(1));
    }

    fn limited(limit: u64) -> ScriptHost {
        ScriptHost::new(HostConfig {
            max_operations: NonZeroU64::new(limit),
            ..HostConfig::default()
        })
    }

    #[test]
    fn test_jsboard_republished_each_call() {
        let mut host = host();
        host.load_source(
            "jsboard",
            "fn makeMove(n) {\n  if jsboard != board() { throw \"stale jsboard\"; }\n  [jsboard, nID]\n}",
        )
        .unwrap();

        let mut board = board16();
        board.set(5, "21");
        let value = call(&mut host, &board).into_array().unwrap();
        assert_eq!(value[0].clone().into_string().unwrap(), board.encode());
        assert_eq!(value[1].as_int().unwrap(), 1);

        board.set(5, "");
        board.set(9, "1");
        let value = call(&mut host, &board).into_array().unwrap();
        assert_eq!(value[0].clone().into_string().unwrap(), board.encode());
    }

    #[test]
    fn test_operation_limit_during_load() {
        let mut host = limited(100);
        let err = host
            .load_source("spin", "let i = 0;\nloop { i += 1; }\nfn makeMove(n) { [0, 1, 0] }")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptSyntaxError);
        assert!(!host.is_ready());
    }

    #[test]
    fn test_operation_limit() {
        let mut host = limited(1_000);
        host.load_source("loop", "fn makeMove(n) { loop { n += 1; } }")
            .unwrap();
        let outcome = host.call_entry_point(&board16(), 1, &[]).unwrap();
        let err = validate_move(outcome, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptRuntimeError);
    }
}
