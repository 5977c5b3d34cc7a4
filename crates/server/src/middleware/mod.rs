//! HTTP middleware stack for the user API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per request)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (propagate or mint `x-request-id`)
//! 4. API headers (nosniff, no-store, frame denial)

pub mod api_headers;
pub mod request_id;
pub mod trace;

pub use api_headers::api_headers_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use trace::trace_layer;
