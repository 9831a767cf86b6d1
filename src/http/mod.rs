//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → dispatch.rs (buffer body, re-dispatch template fallbacks)
//!     → middleware/locale_rewrite.rs (pass through, rewrite, or 500 at the limit)
//!     → app (pages and server actions)
//!     → response.rs (JSON errors)
//! ```

pub mod dispatch;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::TemplateFallback;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
