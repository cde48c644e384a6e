//! Binding a rendering surface to a session's published origin.

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What a view should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSource {
    /// Load from the local server
    Uri(String),
    /// Static placeholder content, no network load
    Html(String),
}

impl ViewSource {
    pub fn for_origin(origin: Option<&str>, fallback_html: &str) -> Self {
        match origin {
            Some(origin) if !origin.is_empty() => Self::Uri(origin.to_string()),
            _ => Self::Html(fallback_html.to_string()),
        }
    }
}

/// A rendering surface.
pub trait ViewBinding: Send + Sync {
    fn load(&self, source: ViewSource);
}

/// Render the current origin, then re-render on every change until the
/// origin channel closes. Repeated identical sources are rendered once.
pub fn bind_view(
    mut origin_rx: watch::Receiver<Option<String>>,
    binding: Arc<dyn ViewBinding>,
    fallback_html: impl Into<String>,
) -> JoinHandle<()> {
    let fallback_html = fallback_html.into();

    tokio::spawn(async move {
        let mut rendered: Option<ViewSource> = None;
        loop {
            let source =
                ViewSource::for_origin(origin_rx.borrow_and_update().as_deref(), &fallback_html);
            if rendered.as_ref() != Some(&source) {
                binding.load(source.clone());
                rendered = Some(source);
            }

            if origin_rx.changed().await.is_err() {
                debug!("Origin channel closed, view binding finished");
                break;
            }
        }
    })
}
