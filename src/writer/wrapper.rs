//! Status interception and response bookkeeping.
//!
//! # Responsibilities
//! - Record the status actually sent and the number of body bytes accepted
//! - Substitute a status, add headers and reroute body writes when a
//!   registered status is committed
//!
//! # Design Decisions
//! - Resolution happens once, on the first `write_header` (or first `write`)
//! - A `write` before any commit sends `200 OK` without consulting intercepts
//! - First commit wins; later commits are ignored and logged
//! - Rules registered after resolution are ignored and logged
//! - Intercept headers are appended, never replacing existing values

use std::collections::HashMap;
use std::fmt;
use std::io;

use axum::http::{HeaderMap, StatusCode};

use super::ResponseWriter;

/// Replacement body writer installed by an intercept.
///
/// Receives the wrapped sink so it can emit its own body, and returns the
/// number of input bytes it consumed.
pub type WriteFn = Box<dyn FnMut(&mut dyn ResponseWriter, &[u8]) -> io::Result<usize> + Send>;

/// Substitution applied when the expected status is committed.
struct Intercept {
    status: StatusCode,
    headers: HeaderMap,
    write: Option<WriteFn>,
}

/// Wraps a [`ResponseWriter`], recording the final status and body size and
/// applying intercepts keyed by the status a downstream handler commits.
pub struct ResponseWriterWrapper<W> {
    inner: W,
    status: StatusCode,
    size: usize,
    resolved: bool,
    intercepts: HashMap<StatusCode, Intercept>,
    intercept_write: Option<WriteFn>,
}

impl<W: ResponseWriter> ResponseWriterWrapper<W> {
    /// Wrap a sink. The status starts at `200 OK` and the size at zero.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            status: StatusCode::OK,
            size: 0,
            resolved: false,
            intercepts: HashMap::new(),
            intercept_write: None,
        }
    }

    /// Register an intercept for `expected`. When a handler commits that
    /// status, `intended` is sent instead, `headers` are added to the
    /// response and, if given, `write` replaces the sink's body writer for
    /// the rest of the exchange.
    ///
    /// Registering the same `expected` status again replaces the earlier rule.
    /// Has no effect once the response status has been resolved.
    pub fn add_intercept(
        &mut self,
        expected: StatusCode,
        intended: StatusCode,
        write: Option<WriteFn>,
        headers: HeaderMap,
    ) {
        if self.resolved {
            tracing::warn!(
                expected = expected.as_u16(),
                intended = intended.as_u16(),
                status = self.status.as_u16(),
                "Intercept registered after response status was resolved, ignoring"
            );
            return;
        }

        self.intercepts.insert(
            expected,
            Intercept {
                status: intended,
                headers,
                write,
            },
        );
    }

    /// Status code sent to the wrapped sink.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Total body bytes accepted, whether written to the sink or consumed by
    /// an intercept's writer.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the status has been committed.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: ResponseWriter> ResponseWriter for ResponseWriterWrapper<W> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.resolved {
            tracing::warn!(
                status = status.as_u16(),
                committed = self.status.as_u16(),
                "Superfluous write_header call ignored"
            );
            return;
        }
        self.resolved = true;

        let mut status = status;
        if let Some(intercept) = self.intercepts.remove(&status) {
            tracing::debug!(
                expected = status.as_u16(),
                intended = intercept.status.as_u16(),
                headers = intercept.headers.len(),
                write_override = intercept.write.is_some(),
                "Intercepting response status"
            );

            status = intercept.status;
            self.intercept_write = intercept.write;

            let headers = self.inner.headers_mut();
            for (name, value) in intercept.headers.iter() {
                headers.append(name.clone(), value.clone());
            }
        }
        // The table is only consulted once.
        self.intercepts.clear();

        self.status = status;
        self.inner.write_header(status);
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.resolved {
            // Implicit commit of the sink's default status; intercepts are not consulted.
            self.resolved = true;
            self.status = StatusCode::OK;
            self.intercepts.clear();
            self.inner.write_header(StatusCode::OK);
        }

        let written = match self.intercept_write.as_mut() {
            Some(write) => write(&mut self.inner, data)?,
            None => self.inner.write(data)?,
        };
        self.size += written;

        Ok(written)
    }
}

impl<W> fmt::Debug for ResponseWriterWrapper<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriterWrapper")
            .field("status", &self.status)
            .field("size", &self.size)
            .field("resolved", &self.resolved)
            .field("intercepts", &self.intercepts.keys().collect::<Vec<_>>())
            .field("intercept_write", &self.intercept_write.is_some())
            .finish()
    }
}
