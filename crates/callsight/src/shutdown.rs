// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns SIGINT/SIGTERM into a [`CancellationToken`] for `callsight serve`.
//!
//! The HTTP server drains in-flight `/analyze_call` requests once the token
//! fires; the record store is closed after that.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawns a watcher that cancels the returned token on the first signal.
///
/// Cancelling the token yourself stops the watcher.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => watcher.cancel(),
            _ = watcher.cancelled() => {}
        }
        debug!("signal watcher stopped");
    });

    token
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        info!("received SIGINT (Ctrl+C), initiating shutdown");
                    }
                    _ = sigterm.recv() => {
                        info!("received SIGTERM, initiating shutdown");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                let _ = ctrl_c.await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}
