//! Request logging switched on per category by `ErrorLogSettings`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use wr_config::ErrorLogSettings;

/// Requests slower than this are reported when timeout logging is on
const SLOW_REQUEST: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Diagnostics {
    flags: ErrorLogSettings,
    mounts: Arc<[String]>,
}

impl Diagnostics {
    pub fn new(flags: ErrorLogSettings, mounts: impl IntoIterator<Item = String>) -> Self {
        Self {
            flags,
            mounts: mounts.into_iter().collect(),
        }
    }

    /// Alias prefix that serves `path`, if any.
    pub fn mount_for(&self, path: &str) -> Option<&str> {
        self.mounts
            .iter()
            .map(String::as_str)
            .find(|prefix| {
                path == *prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

pub async fn log_request(
    State(diagnostics): State<Diagnostics>,
    request: Request,
    next: Next,
) -> Response {
    let flags = diagnostics.flags;
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_headers = (flags.request_header || flags.request_header_on_error)
        .then(|| request.headers().clone());

    if flags.request_handling {
        info!("--> {method} {uri}");
    }
    if flags.request_header
        && let Some(ref headers) = request_headers
    {
        info!("Request headers for {uri}: {}", format_headers(headers));
    }
    if flags.condition_handling {
        match diagnostics.mount_for(uri.path()) {
            Some(prefix) => info!("{uri} matched alias {prefix}"),
            None => info!("{uri} matched document root"),
        }
    }

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();
    let status = response.status();

    if flags.file_not_found && status == StatusCode::NOT_FOUND {
        warn!("File not found: {uri}");
    }
    if flags.request_header_on_error
        && !flags.request_header
        && (status.is_client_error() || status.is_server_error())
        && let Some(ref headers) = request_headers
    {
        warn!(
            "{method} {uri} failed with {status}, request headers: {}",
            format_headers(headers)
        );
    }
    if flags.response_header {
        info!("Response headers for {uri}: {}", format_headers(response.headers()));
    }
    if flags.request_handling {
        info!(
            "<-- {method} {uri} {status} in {}",
            humantime::format_duration(elapsed)
        );
    }
    if flags.timeouts && elapsed >= SLOW_REQUEST {
        warn!(
            "{method} {uri} took {}",
            humantime::format_duration(elapsed)
        );
    }

    response
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join(", ")
}
