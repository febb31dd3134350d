//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use response_interceptor::{Handler, HttpServer, ServerConfig};

/// A server running on an ephemeral port. Shuts down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Serve `handler` with default configuration.
pub async fn start_server(handler: impl Handler) -> TestServer {
    start_server_with(HttpServer::new(ServerConfig::default(), handler)).await
}

/// Run an already built server.
pub async fn start_server_with(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = server
            .run_until(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        shutdown: Some(tx),
    }
}

/// Client that neither follows redirects nor uses a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
