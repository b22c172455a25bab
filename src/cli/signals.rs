//! cli::signals
//!
//! Process-wide interrupt handling.
//!
//! Ctrl-C or SIGTERM ends the run with `ABORTED!` wherever it lands: a
//! line prompt, the Spotify fetch, or the wait for the OAuth redirect.
//! Raw-mode widgets never see SIGINT (the terminal delivers Ctrl-C as a
//! key), so they report a cancelled prompt instead.

use std::sync::mpsc;

/// Printed to stderr when a signal ends the run.
pub const ABORTED_MESSAGE: &str = "\nABORTED!";

/// Exit status after an interrupt (128 + SIGINT).
pub const ABORT_EXIT_CODE: i32 = 130;

/// Start the listener thread.
///
/// Returns once the handlers are registered, so a signal arriving right
/// after this call is already caught. Failure to register is logged and
/// leaves the default signal behavior in place.
pub fn install() {
    let (ready_tx, ready_rx) = mpsc::channel();

    let spawned = std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::warn!(error = %e, "interrupt handler unavailable");
                    let _ = ready_tx.send(());
                    return;
                }
            };
            if runtime.block_on(wait_for_signal(ready_tx)) {
                abort();
            }
        });

    match spawned {
        Ok(_) => {
            let _ = ready_rx.recv();
        }
        Err(e) => tracing::warn!(error = %e, "failed to start interrupt handler"),
    }
}

/// Resolve `true` once SIGINT or SIGTERM arrives.
#[cfg(unix)]
async fn wait_for_signal(ready: mpsc::Sender<()>) -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let streams = signal(SignalKind::interrupt())
        .and_then(|int| signal(SignalKind::terminate()).map(|term| (int, term)));
    let _ = ready.send(());

    match streams {
        Ok((mut interrupt, mut terminate)) => {
            tokio::select! {
                _ = interrupt.recv() => tracing::debug!("SIGINT"),
                _ = terminate.recv() => tracing::debug!("SIGTERM"),
            }
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "interrupt handler unavailable");
            false
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal(ready: mpsc::Sender<()>) -> bool {
    let _ = ready.send(());
    match tokio::signal::ctrl_c().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "interrupt handler unavailable");
            false
        }
    }
}

fn abort() -> ! {
    // A widget may hold raw mode; hand the terminal back first.
    let _ = crossterm::terminal::disable_raw_mode();
    eprintln!("{}", ABORTED_MESSAGE);
    std::process::exit(ABORT_EXIT_CODE);
}

