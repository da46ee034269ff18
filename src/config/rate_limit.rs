use std::env;

use super::auth::parse_bool_env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Per-group rate limits: `auth` covers login/register/reset endpoints,
/// `public_read` the unauthenticated item listing, `protected`
/// everything behind the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub public_read: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: RateLimitRule::new(5, 10),
            public_read: RateLimitRule::new(30, 60),
            protected: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: parse_bool_env("RATE_LIMIT_ENABLED", defaults.enabled),
            auth: rule_from_env("RATE_LIMIT_AUTH", defaults.auth),
            public_read: rule_from_env("RATE_LIMIT_PUBLIC", defaults.public_read),
            protected: rule_from_env("RATE_LIMIT_PROTECTED", defaults.protected),
        }
    }
}

fn rule_from_env(var_name: &str, default: RateLimitRule) -> RateLimitRule {
    let Ok(raw) = env::var(var_name) else {
        return default;
    };
    match parse_rule(&raw) {
        Ok(rule) => rule,
        Err(err) => {
            tracing::warn!("Invalid {} '{}': {}", var_name, raw, err);
            default
        }
    }
}

// Rule format: "per_second:burst", e.g. "10:20".
fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw.trim()))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 {
        return Err("per_second must be > 0".to_string());
    }
    if burst_size == 0 {
        return Err("burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}
