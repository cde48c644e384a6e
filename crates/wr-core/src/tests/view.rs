use crate::{ViewBinding, ViewSource, bind_view};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::eq;
use tokio::sync::watch;

const FALLBACK: &str = "<p>html render</p>";

#[derive(Default)]
struct RecordingView {
    loads: Mutex<Vec<ViewSource>>,
}

impl ViewBinding for RecordingView {
    fn load(&self, source: ViewSource) {
        self.loads.lock().unwrap().push(source);
    }
}

#[test]
fn given_origin_when_choosing_source_then_uri() {
    assert_that!(
        ViewSource::for_origin(Some("http://127.0.0.1:3000"), FALLBACK),
        eq(&ViewSource::Uri("http://127.0.0.1:3000".into()))
    );
}

#[test]
fn given_no_or_empty_origin_when_choosing_source_then_fallback_html() {
    assert_that!(
        ViewSource::for_origin(None, FALLBACK),
        eq(&ViewSource::Html(FALLBACK.into()))
    );
    assert_that!(
        ViewSource::for_origin(Some(""), FALLBACK),
        eq(&ViewSource::Html(FALLBACK.into()))
    );
}

#[tokio::test]
async fn given_origin_changes_when_bound_then_view_follows_until_channel_closes() {
    // Given
    let (tx, rx) = watch::channel(None);
    let view = Arc::new(RecordingView::default());
    let task = bind_view(rx, view.clone(), FALLBACK);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // When
    tx.send_replace(Some("http://127.0.0.1:3000".into()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send_replace(None);
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(tx);
    task.await.unwrap();

    // Then
    let loads = view.loads.lock().unwrap().clone();
    assert_that!(
        loads,
        eq(&vec![
            ViewSource::Html(FALLBACK.into()),
            ViewSource::Uri("http://127.0.0.1:3000".into()),
            ViewSource::Html(FALLBACK.into()),
        ])
    );
}

#[tokio::test]
async fn given_same_origin_republished_when_bound_then_rendered_once() {
    // Given
    let (tx, rx) = watch::channel(Some("http://127.0.0.1:3000".to_string()));
    let view = Arc::new(RecordingView::default());
    let task = bind_view(rx, view.clone(), FALLBACK);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // When
    tx.send_replace(Some("http://127.0.0.1:3000".into()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(tx);
    task.await.unwrap();

    // Then
    assert_that!(view.loads.lock().unwrap().len(), eq(1));
}
