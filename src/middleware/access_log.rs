//! Access logging from the final status and size of each response.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::http::Request;

use crate::handler::Handler;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::writer::{ResponseWriter, ResponseWriterWrapper};

/// Logs one line per request with the status and byte count actually sent.
#[derive(Debug, Clone)]
pub struct AccessLog<H> {
    inner: H,
}

impl<H: Handler> AccessLog<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: Handler> Handler for AccessLog<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        let start_time = Instant::now();
        let mut ww = ResponseWriterWrapper::new(w);

        self.inner.serve(&mut ww, req);

        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".to_string());
        let request_id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        let uri = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        tracing::info!(
            remote_addr = %remote_addr,
            request_id = %request_id,
            method = %req.method(),
            uri = %uri,
            version = ?req.version(),
            status = ww.status().as_u16(),
            size = ww.size(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Request served"
        );

        metrics::record_response(
            req.method().as_str(),
            ww.status().as_u16(),
            ww.size(),
            start_time,
        );
    }
}
