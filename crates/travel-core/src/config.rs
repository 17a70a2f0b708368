//! ============================================================================
//! App Config - Environment-driven settings
//! ============================================================================
//! Read after `dotenvy::dotenv()` so a local `.env` file can supply values.
//! - TRAVEL_ADMIN_BIND    admin HTTP bind address (default 127.0.0.1:8787)
//! - TRAVEL_AUTH_COOKIE   cookie holding the admin token (default "token")
//! - TRAVEL_STRICT_TIERS  "1"/"true" rejects misordered tier thresholds
//! - TRAVEL_DB_PATH       database file, read by `AdminDb::open`
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::access::{GateConfig, DEFAULT_AUTH_COOKIE};
use crate::rewards::ValidationPolicy;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub auth_cookie: String,
    pub strict_tier_ordering: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("TRAVEL_ADMIN_BIND")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            auth_cookie: std::env::var("TRAVEL_AUTH_COOKIE")
                .unwrap_or_else(|_| DEFAULT_AUTH_COOKIE.to_string()),
            strict_tier_ordering: std::env::var("TRAVEL_STRICT_TIERS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

impl AppConfig {
    pub fn gate_config(&self) -> GateConfig {
        GateConfig::with_cookie_name(self.auth_cookie.clone())
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            strict_tier_ordering: self.strict_tier_ordering,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        other => {
            warn!("Unrecognized TRAVEL_STRICT_TIERS value '{}', using false", other);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("off"));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn test_derived_settings() {
        let config = AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            auth_cookie: "admin_token".to_string(),
            strict_tier_ordering: true,
        };
        assert_eq!(config.gate_config().cookie_name, "admin_token");
        assert_eq!(config.gate_config().login_path, "/admin/login");
        assert!(config.validation_policy().strict_tier_ordering);
    }
}
