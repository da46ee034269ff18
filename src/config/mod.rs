pub mod auth;
pub mod database;
pub mod email;
pub mod jwt;
pub mod rate_limit;

pub use auth::AuthConfig;
pub use email::EmailConfig;
pub use rate_limit::RateLimitConfig;
