//! # Cross-platform OS termination-signal handling.
//!
//! Backs [`Manager::run_until_signal`](crate::Manager::run_until_signal):
//! completes when the process receives SIGINT or SIGTERM (Ctrl-C on
//! non-Unix platforms).

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. Returns `Ok(())` when a
/// signal is received, or `Err` if listener registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

/// Waits for a termination signal (Ctrl-C).
#[cfg(not(unix))]
pub(crate) async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
