//! Response sink abstraction and its decorators.
//!
//! # Data Flow
//! ```text
//! handler
//!     → ResponseWriterWrapper (intercept rules, status/size bookkeeping)
//!     → ResponseBuffer (status line, headers, body)
//!     → axum Response<Body>
//! ```
//!
//! # Design Decisions
//! - One object-safe trait so decorators nest as `&mut dyn ResponseWriter`
//! - Status commit is infallible; only body writes report errors
//! - Blanket impls for `&mut W` and `Box<W>` keep wrappers composable

use std::fmt;
use std::io;

use axum::http::{HeaderMap, StatusCode};

pub mod buffer;
pub mod wrapper;

pub use buffer::ResponseBuffer;
pub use wrapper::{ResponseWriterWrapper, WriteFn};

/// Sink for a single HTTP response.
pub trait ResponseWriter {
    /// Headers that will be sent with the response.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the response headers.
    ///
    /// Changes made after `write_header` are not guaranteed to reach the client.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status code and the current headers.
    fn write_header(&mut self, status: StatusCode);

    /// Write body bytes, committing `200 OK` first if no status was sent.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Formatted write, so `write!` and `writeln!` work on any sink.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        io::Write::write_fmt(&mut Adapter(self), args)
    }
}

/// Bridges a sink to `io::Write` for formatted output.
struct Adapter<'a, W: ?Sized>(&'a mut W);

impl<W: ResponseWriter + ?Sized> io::Write for Adapter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for Box<W> {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }
}
