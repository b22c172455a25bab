//! CLI entry point for commit-vibes.
//!
//! Interrupts never reach here; `cli::signals` prints `ABORTED!` and exits.

use std::process::ExitCode;

use commit_vibes::cli;
use commit_vibes::engine::EngineError;
use commit_vibes::ui::PromptError;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    for cause in err.chain() {
        let engine_cancel = cause
            .downcast_ref::<EngineError>()
            .is_some_and(EngineError::is_cancelled);
        if engine_cancel {
            eprintln!("❌ Commit canceled.");
            return;
        }
        if let Some(PromptError::Cancelled) = cause.downcast_ref::<PromptError>() {
            eprintln!("❌ Commit canceled.");
            return;
        }
    }
    eprintln!("error: {:#}", err);
}
