#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tower::Layer;
use url_splitter::domain::click_worker::persist_click;
use url_splitter::domain::entities::{Destination, NewSplit, Split};
use url_splitter::domain::redirect_event::RedirectEvent;
use url_splitter::infrastructure::Storage;
use url_splitter::routes::router;
use url_splitter::state::AppState;

pub const PEER_ADDR: &str = "127.0.0.1:12345";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Test server over the in-memory backend.
///
/// The click queue receiver is handed back instead of running the worker, so
/// tests decide when queued clicks are persisted.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Storage,
    pub clicks_rx: mpsc::Receiver<RedirectEvent>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(100, false)
}

pub fn create_test_app_with(queue_capacity: usize, behind_proxy: bool) -> TestApp {
    let storage = Storage::memory();
    let (tx, clicks_rx) = mpsc::channel(queue_capacity);
    let state = AppState::new(&storage, tx, behind_proxy);

    let app = router(state, None).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        storage,
        clicks_rx,
    }
}

impl TestApp {
    /// Persists every click queued so far, returning how many were written.
    pub async fn flush_clicks(&mut self) -> usize {
        let mut written = 0;
        while let Ok(event) = self.clicks_rx.try_recv() {
            persist_click(self.storage.clicks.as_ref(), event)
                .await
                .unwrap();
            written += 1;
        }
        written
    }
}

pub async fn create_split(storage: &Storage, slug: &str, destinations: &[(&str, f64)]) -> Split {
    storage
        .splits
        .create(NewSplit {
            slug: slug.to_string(),
            name: format!("Split {}", slug),
            destinations: destinations
                .iter()
                .map(|(url, weight)| Destination::new(*url, *weight))
                .collect(),
        })
        .await
        .unwrap()
}
