//! HTTP response interception library.
//!
//! Wraps a response sink so the status a handler commits can be swapped for
//! another, headers injected and the body rerouted, while recording the
//! status and size actually sent.

pub mod config;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod writer;

pub use config::ServerConfig;
pub use handler::{handler_fn, Handler};
pub use http::HttpServer;
pub use writer::{ResponseBuffer, ResponseWriter, ResponseWriterWrapper, WriteFn};
