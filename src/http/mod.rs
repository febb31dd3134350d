//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID assigned and echoed)
//!     → dispatch (collect body, run Handler with a ResponseBuffer)
//!     → ResponseBuffer::into_response
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_handler, AppState, HttpServer, ServerError};
