//! Redirect requests whose downstream status matches a configured code.
//!
//! # Responsibilities
//! - Build the redirect target from a base URL plus the request path and query
//! - Register an intercept so the downstream status is replaced and a
//!   `Location` header added
//!
//! # Design Decisions
//! - The downstream handler always runs; only its committed status decides
//! - The downstream body is forwarded unless `discard_body` is set

use std::io;

use axum::body::Bytes;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use url::Url;

use crate::handler::Handler;
use crate::writer::{ResponseWriter, ResponseWriterWrapper, WriteFn};

/// Redirects to another host when the inner handler commits `expected`.
#[derive(Debug, Clone)]
pub struct Redirect<H> {
    inner: H,
    target: Url,
    expected: StatusCode,
    intended: StatusCode,
    discard_body: bool,
}

impl<H: Handler> Redirect<H> {
    /// Redirect `404 Not Found` to `target` with `307 Temporary Redirect`.
    pub fn new(inner: H, target: Url) -> Self {
        Self {
            inner,
            target,
            expected: StatusCode::NOT_FOUND,
            intended: StatusCode::TEMPORARY_REDIRECT,
            discard_body: false,
        }
    }

    /// Status that triggers the redirect.
    pub fn expected(mut self, status: StatusCode) -> Self {
        self.expected = status;
        self
    }

    /// Status sent in place of the expected one.
    pub fn intended(mut self, status: StatusCode) -> Self {
        self.intended = status;
        self
    }

    /// Swallow the inner handler's body when redirecting.
    pub fn discard_body(mut self, discard: bool) -> Self {
        self.discard_body = discard;
        self
    }

    fn location(&self, req: &Request<Bytes>) -> Option<HeaderValue> {
        let mut location = self.target.clone();
        location.set_path(req.uri().path());
        location.set_query(req.uri().query());
        HeaderValue::from_str(location.as_str()).ok()
    }
}

impl<H: Handler> Handler for Redirect<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        let mut ww = ResponseWriterWrapper::new(w);

        match self.location(req) {
            Some(location) => {
                let mut headers = HeaderMap::new();
                headers.insert(LOCATION, location);

                let write: Option<WriteFn> = if self.discard_body {
                    Some(Box::new(discard))
                } else {
                    None
                };
                ww.add_intercept(self.expected, self.intended, write, headers);
            }
            None => {
                tracing::warn!(
                    target_url = %self.target,
                    path = %req.uri().path(),
                    "Redirect location is not a valid header value, skipping"
                );
            }
        }

        self.inner.serve(&mut ww, req);
    }
}

/// Accepts and drops body bytes.
fn discard(_w: &mut dyn ResponseWriter, data: &[u8]) -> io::Result<usize> {
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, NotFound};
    use crate::middleware::AccessLog;
    use crate::writer::ResponseBuffer;

    fn target() -> Url {
        Url::parse("http://other.host/").unwrap()
    }

    fn get(uri: &str) -> Request<Bytes> {
        Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_redirects_not_found() {
        let redirect = Redirect::new(NotFound, target());

        let mut buffer = ResponseBuffer::new();
        redirect.serve(&mut buffer, &get("/path/to/file.txt?v=1"));

        assert_eq!(buffer.status(), Some(StatusCode::TEMPORARY_REDIRECT));
        assert_eq!(
            buffer.headers().get(LOCATION).unwrap(),
            "http://other.host/path/to/file.txt?v=1"
        );
        assert_eq!(buffer.body(), b"404 page not found\n");
    }

    #[test]
    fn test_discard_body() {
        let redirect = Redirect::new(NotFound, target()).discard_body(true);

        let mut buffer = ResponseBuffer::new();
        redirect.serve(&mut buffer, &get("/missing"));

        assert_eq!(buffer.status(), Some(StatusCode::TEMPORARY_REDIRECT));
        assert!(buffer.body().is_empty());
    }

    #[test]
    fn test_found_is_untouched() {
        let redirect = Redirect::new(
            handler_fn(|w, _req| {
                w.write(b"here").unwrap();
            }),
            target(),
        );

        let mut buffer = ResponseBuffer::new();
        redirect.serve(&mut buffer, &get("/present"));

        assert_eq!(buffer.status(), Some(StatusCode::OK));
        assert!(buffer.headers().get(LOCATION).is_none());
        assert_eq!(buffer.body(), b"here");
    }

    #[test]
    fn test_custom_statuses() {
        let redirect = Redirect::new(
            handler_fn(|w, _req| w.write_header(StatusCode::GONE)),
            target(),
        )
        .expected(StatusCode::GONE)
        .intended(StatusCode::PERMANENT_REDIRECT);

        let mut buffer = ResponseBuffer::new();
        redirect.serve(&mut buffer, &get("/old"));

        assert_eq!(buffer.status(), Some(StatusCode::PERMANENT_REDIRECT));
        assert_eq!(buffer.headers().get(LOCATION).unwrap(), "http://other.host/old");
    }

    #[test]
    fn test_logger_sees_redirected_status() {
        let handler = AccessLog::new(Redirect::new(NotFound, target()));

        let mut buffer = ResponseBuffer::new();
        handler.serve(&mut buffer, &get("/missing"));
        assert_eq!(buffer.status(), Some(StatusCode::TEMPORARY_REDIRECT));
    }
}
