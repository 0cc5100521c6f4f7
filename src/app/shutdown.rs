//! Graceful shutdown handling.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Resolves on the first SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    log::info!("Shutdown signal received");
    Ok(())
}

/// Cancels all background loops and waits for them to finish.
///
/// Each task gets at most `deadline` to return; a task still running after
/// that is aborted and logged.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    deadline: Duration,
) {
    cancel.cancel();
    for (name, mut task) in tasks {
        match tokio::time::timeout(deadline, &mut task).await {
            Ok(Ok(())) => log::debug!("{} stopped", name),
            Ok(Err(e)) => log::error!("{} task failed: {}", name, e),
            Err(_) => {
                log::warn!("{} did not stop within {:?}, aborting", name, deadline);
                task.abort();
            }
        }
    }
}

/// Gives a task that ends on its own up to `deadline` to finish.
///
/// Returns the handle when the task is still running, so the caller can
/// cancel it with the other loops.
pub async fn wait_for_drain(
    name: &'static str,
    mut task: JoinHandle<()>,
    deadline: Duration,
) -> Option<JoinHandle<()>> {
    match tokio::time::timeout(deadline, &mut task).await {
        Ok(Ok(())) => {
            log::debug!("{} drained", name);
            None
        }
        Ok(Err(e)) => {
            log::error!("{} task failed: {}", name, e);
            None
        }
        Err(_) => Some(task),
    }
}
