// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use super::shutdown;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until shutdown is requested.
///
/// Accept errors are logged and the loop keeps going; the listener is
/// dropped (and the port released) on return. Each connection gets its own
/// copy of `shutdown` so it can wind down on the same signal.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stop = shutdown.clone();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &shutdown);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown::requested(&mut stop) => {
                logger::log_info("[Shutdown] Stopping accept loop");
                break;
            }
        }
    }

    drop(listener);
    Ok(())
}
