//! Script validation command implementation.

use super::CliError;
use rayon::prelude::*;
use stackconquer::{HostConfig, ScriptHost, ScriptResult};
use std::path::{Path, PathBuf};

/// Execute the validate command.
///
/// Every script is loaded into its own host; hosts are independent, so they
/// load in parallel.
///
/// # Errors
///
/// Returns an error if any script fails to load.
pub(crate) fn execute(scripts: &[PathBuf], config: &HostConfig) -> Result<(), CliError> {
    let results: Vec<(&Path, ScriptResult<()>)> = scripts
        .par_iter()
        .map(|path| {
            let mut host = ScriptHost::new(config.clone());
            (path.as_path(), host.load_script(path))
        })
        .collect();

    let mut failed = 0usize;
    for (path, result) in &results {
        println!("Validating: {}", path.display());
        match result {
            Ok(()) => {
                print_check("script evaluates", true);
                print_check("makeMove(possible_moves) defined", true);
            }
            Err(e) => {
                failed += 1;
                print_check(&e.kind().to_string(), false);
                println!("    {e}");
            }
        }
        println!();
    }

    if failed > 0 {
        return Err(CliError::new(format!(
            "{failed} of {} scripts failed validation",
            results.len()
        )));
    }

    println!("Validation successful!");
    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
