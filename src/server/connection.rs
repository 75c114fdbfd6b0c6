// Connection handling module
// Accepts a single TCP connection and serves it with the badge handler

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, Version};
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::sync::watch;

use super::shutdown;
use crate::config::AppState;
use crate::handler;
use crate::logger::{self, AccessRecord};

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `shutdown` - Shutdown broadcast; the connection closes gracefully once set
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &watch::Receiver<bool>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        shutdown.clone(),
    );
}

/// Serve one connection on its own task.
///
/// Request headers must arrive within `read_timeout` seconds. Handlers are
/// never cut short: the connection only closes between requests, when it has
/// sat idle for `keep_alive_timeout` seconds or shutdown is requested. A
/// `keep_alive_timeout` of 0 serves one request per connection. The counter
/// is decremented when done.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let idle_limit = Duration::from_secs(performance.keep_alive_timeout);

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new()).keep_alive(keep_alive);
        if performance.read_timeout > 0 {
            builder.header_read_timeout(Duration::from_secs(performance.read_timeout));
        }

        let activity = Arc::new(Activity::new());
        let service_state = Arc::clone(&state);
        let service_activity = Arc::clone(&activity);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let busy = Activity::enter(&service_activity);
                let state = Arc::clone(&service_state);
                async move {
                    let resp = serve_logged(req, state, peer_addr).await;
                    drop(busy);
                    resp
                }
            }),
        );
        tokio::pin!(conn);

        let mut closing = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }

                () = shutdown::requested(&mut shutdown), if !closing => {
                    logger::log_debug(&format!("[Connection] Closing {peer_addr} for shutdown"));
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }

                () = tokio::time::sleep(activity.idle_check_in(idle_limit)), if keep_alive && !closing => {
                    if activity.idle_for().is_some_and(|idle| idle >= idle_limit) {
                        logger::log_debug(&format!(
                            "[Connection] Closing {peer_addr} after {}s idle",
                            idle_limit.as_secs()
                        ));
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Request bookkeeping for one connection, used to find idle keep-alive time
struct Activity {
    opened: Instant,
    in_flight: AtomicUsize,
    /// Milliseconds after `opened` at which the last request finished
    last_done_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            opened: Instant::now(),
            in_flight: AtomicUsize::new(0),
            last_done_ms: AtomicU64::new(0),
        }
    }

    fn enter(this: &Arc<Self>) -> Busy {
        this.in_flight.fetch_add(1, Ordering::SeqCst);
        Busy(Arc::clone(this))
    }

    /// Time since the last request finished, `None` while one is running
    fn idle_for(&self) -> Option<Duration> {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return None;
        }
        let last_done = Duration::from_millis(self.last_done_ms.load(Ordering::SeqCst));
        Some(self.opened.elapsed().saturating_sub(last_done))
    }

    /// How long to sleep before the idle limit could next be reached
    fn idle_check_in(&self, idle_limit: Duration) -> Duration {
        self.idle_for()
            .map_or(idle_limit, |idle| idle_limit.saturating_sub(idle))
    }
}

/// Marks a request in flight until dropped
struct Busy(Arc<Activity>);

impl Drop for Busy {
    fn drop(&mut self) {
        let now_ms = u64::try_from(self.0.opened.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.0.last_done_ms.store(now_ms, Ordering::SeqCst);
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run the handler and write one access log line for the exchange
async fn serve_logged<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
    if !state.config.logging.access_log {
        return handler::handle_request(req, state).await;
    }

    let started = Instant::now();
    let mut record = access_record(&req, peer_addr);

    let resp = handler::handle_request(req, state).await?;

    record.status = resp.status().as_u16();
    record.bytes_sent = resp.body().size_hint().exact().unwrap_or(0);
    record.elapsed = started.elapsed();
    logger::log_access(&record);

    Ok(resp)
}

/// Request side of the access record; response fields are filled in later
fn access_record<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessRecord {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    AccessRecord {
        client: peer_addr.ip(),
        received_at: Local::now(),
        method: req.method().to_string(),
        target: req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string),
        version: http_version(req.version()),
        status: 0,
        bytes_sent: 0,
        referer: header(REFERER),
        user_agent: header(USER_AGENT),
        elapsed: Duration::ZERO,
    }
}

fn http_version(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else if version == Version::HTTP_3 {
        "3"
    } else {
        "1.1"
    }
}
