//! In-memory response sink.
//!
//! Collects the committed status, the headers as they stood at commit time and
//! the body, then converts into an axum response once the handler returns.

use std::io;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::ResponseWriter;

/// Sink that buffers a response for conversion into [`Response<Body>`].
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    headers: HeaderMap,
    status: Option<StatusCode>,
    committed_headers: Option<HeaderMap>,
    body: Vec<u8>,
}

impl ResponseBuffer {
    /// Create an empty, uncommitted buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Body bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Build the response. An uncommitted buffer becomes an empty `200 OK`.
    pub fn into_response(self) -> Response {
        let status = self.status.unwrap_or(StatusCode::OK);
        let headers = self.committed_headers.unwrap_or(self.headers);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for ResponseBuffer {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            tracing::warn!(
                status = status.as_u16(),
                committed = committed.as_u16(),
                "Superfluous write_header call on committed response"
            );
            return;
        }

        self.status = Some(status);
        self.committed_headers = Some(self.headers.clone());
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
