//! Request dispatch module
//!
//! Entry point for HTTP request processing: health checks, badge route
//! matching, reaction lookup and error translation.

use crate::config::{AppState, HealthConfig, HttpConfig};
use crate::github::FetchError;
use crate::http;
use crate::logger;
use crate::routing::{self, BadgeRequest};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

/// Main entry point for HTTP request handling
///
/// The method is not inspected; every request resolves to exactly one
/// response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let uri = req.uri();
    let http_config = &state.config.http;

    // 1. Health check endpoints
    if let Some(resp) = check_health(uri.path(), &state.config.health, http_config) {
        return Ok(resp);
    }

    // 2. Badge route
    let badge = match routing::parse_badge_request(uri.path(), uri.query()) {
        Ok(badge) => badge,
        Err(e) => {
            logger::log_debug(&format!("{e}: {uri}"));
            return Ok(http::build_400_response(http_config));
        }
    };

    // 3. Fetch, render, respond
    Ok(serve_badge(&badge, &state).await)
}

fn check_health(
    path: &str,
    health: &HealthConfig,
    http_config: &HttpConfig,
) -> Option<Response<Full<Bytes>>> {
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return Some(http::build_health_response("ok", http_config));
    }
    None
}

async fn serve_badge(badge: &BadgeRequest, state: &AppState) -> Response<Full<Bytes>> {
    // Looked up per request so a rotated token is picked up without restart
    let token = state.config.github.token();

    let result = state
        .issues
        .fetch_reaction_count(
            &badge.owner,
            &badge.repo,
            badge.issue_number.get(),
            badge.reaction,
            token.as_deref(),
        )
        .await;

    match result {
        Ok(count) => {
            let svg = state.renderer.render(badge.label(), &count.to_string());
            http::build_badge_response(svg, &state.config.http)
        }
        Err(err) => error_response(badge, &err, &state.config.http),
    }
}

/// Translate a fetch failure: remote API errors keep their status, the rest
/// become 500.
fn error_response(
    badge: &BadgeRequest,
    err: &FetchError,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    logger::log_error(&format!(
        "Reaction fetch failed for {}/{}#{} ({}): {err}",
        badge.owner, badge.repo, badge.issue_number, badge.reaction
    ));

    let message = err.to_string();
    match err.remote_status() {
        Some(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            http::build_text_response(status, &message, http_config)
        }
        None => http::build_500_response(&message, http_config),
    }
}
