//! Handler decorators built on [`ResponseWriterWrapper`].
//!
//! # Data Flow
//! ```text
//! AccessLog   → wraps writer, runs inner, logs final status/size
//!   Redirect  → registers 404 → 307 intercept with Location, runs inner
//!     inner handler (e.g. FileServer)
//! ```
//!
//! [`ResponseWriterWrapper`]: crate::writer::ResponseWriterWrapper

pub mod access_log;
pub mod redirect;

pub use access_log::AccessLog;
pub use redirect::Redirect;
