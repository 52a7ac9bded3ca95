//! API Module
//!
//! HTTP surface of the demo server, composing the cache, rate limiter and
//! retry executor.
//!
//! # Endpoints
//! - `GET /health` - Health check with component details
//! - `GET /stats` - Cache statistics
//! - `GET /lookup/:key` - Rate-limited, cached, retried lookup

pub mod handlers;
pub mod routes;
pub mod upstream;

pub use handlers::{AppState, LOOKUP_TIMEOUT, MAX_KEY_LENGTH};
pub use routes::create_router;
pub use upstream::{EchoResolver, Resolver};
