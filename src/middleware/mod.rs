pub mod auth;
pub mod security;

pub use auth::{auth_middleware, parse_user_id, require_admin, AuthUser};
pub use security::security_headers_middleware;
