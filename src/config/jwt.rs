use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: u64,
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        Ok(Self {
            secret,
            access_token_expiry: parse_seconds("JWT_ACCESS_EXPIRATION", 900), // 15 minutes
            refresh_token_expiry: parse_seconds("JWT_REFRESH_EXPIRATION", 604800), // 7 days
        })
    }
}

fn parse_seconds(var_name: &str, default: u64) -> u64 {
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
