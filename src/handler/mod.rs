//! Request handlers written against a [`ResponseWriter`].
//!
//! # Data Flow
//! ```text
//! http::server (collects request body)
//!     → Handler::serve(&mut dyn ResponseWriter, &Request<Bytes>)
//!     → middleware (AccessLog, Redirect) wrap the writer, then delegate
//!     → leaf handlers (FileServer, NotFound, closures)
//! ```
//!
//! # Design Decisions
//! - Handlers are synchronous and run on the blocking pool
//! - Composition is explicit: middleware owns the handler it decorates

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderValue, Request, StatusCode};

use crate::writer::ResponseWriter;

pub mod files;

pub use files::FileServer;

/// Serves one request by driving a [`ResponseWriter`].
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>);
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        (**self).serve(w, req)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        (**self).serve(w, req)
    }
}

/// Handler backed by a closure. Built with [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Turn a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request<Bytes>) + Send + Sync + 'static,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request<Bytes>) + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        (self.f)(w, req)
    }
}

/// Replies `404 Not Found` to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn serve(&self, w: &mut dyn ResponseWriter, _req: &Request<Bytes>) {
        error(w, "404 page not found", StatusCode::NOT_FOUND);
    }
}

/// Reply with a plain-text error message and status code.
///
/// The message and trailing newline go out in a single write.
pub fn error(w: &mut dyn ResponseWriter, message: &str, status: StatusCode) {
    let headers = w.headers_mut();
    headers.remove(axum::http::header::CONTENT_LENGTH);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    w.write_header(status);

    let body = format!("{message}\n");
    if let Err(e) = w.write(body.as_bytes()) {
        tracing::debug!(error = %e, status = status.as_u16(), "Failed to write error body");
    }
}
