use wr_core::{ViewBinding, ViewSource};

use std::time::Duration;

use log::{info, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder shown while no origin is published
pub const FALLBACK_HTML: &str =
    "<!doctype html><html><body><p>Local server is not running.</p></body></html>";

/// A `ViewBinding` for terminals: reports what a rendering surface would load
/// and checks that a published origin answers.
pub struct ConsoleView {
    client: reqwest::Client,
}

impl ConsoleView {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client for the console view: {e}");
                reqwest::Client::new()
            });

        Self { client }
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBinding for ConsoleView {
    fn load(&self, source: ViewSource) {
        match source {
            ViewSource::Html(html) => {
                info!("View showing fallback content ({} bytes)", html.len());
            }
            ViewSource::Uri(uri) => {
                info!("View loading {uri}");

                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    warn!("No async runtime available, not probing {uri}");
                    return;
                };
                let client = self.client.clone();
                runtime.spawn(async move {
                    match client.get(&uri).send().await {
                        Ok(response) => info!("View loaded {uri}: HTTP {}", response.status()),
                        Err(e) => warn!("View failed to load {uri}: {e}"),
                    }
                });
            }
        }
    }
}
