//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions, in memory)
//! 6. Session expiry (sign out when the backend rejects the token)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminSession, OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
pub use request_id::request_id_middleware;
pub use security_headers::{content_security_policy, security_headers_middleware};
pub use session::{create_session_layer, expire_session_middleware};
