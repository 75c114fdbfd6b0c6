// Graceful shutdown module
// Gives in-flight connections a bounded window to finish

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::logger;

/// Shutdown broadcast: the signal handler flips it to `true` once, the
/// accept loop and every connection watch it.
pub fn channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolves once shutdown has been requested.
///
/// A sender dropped without requesting shutdown never resolves it.
pub async fn requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|&stop| stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// How often the active connection counter is polled while draining
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until no connection is active or `grace` has elapsed.
///
/// Returns the number of connections still open when it gave up (0 when
/// everything finished).
pub async fn drain_connections(conn_counter: &AtomicUsize, grace: Duration) -> usize {
    logger::log_shutdown(conn_counter.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let active = conn_counter.load(Ordering::SeqCst);
        if active == 0 {
            logger::log_info("[Shutdown] All connections closed");
            return 0;
        }

        tokio::select! {
            () = tokio::time::sleep(POLL_INTERVAL) => {}
            () = tokio::time::sleep_until(deadline) => {
                logger::log_warning(&format!(
                    "Grace period of {}s elapsed with {active} connection(s) still open",
                    grace.as_secs()
                ));
                return active;
            }
        }
    }
}
