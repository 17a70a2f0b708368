//! ============================================================================
//! Access Types - Gate routes and decisions
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Root of the administrative route tree
pub const DASHBOARD_ROOT: &str = "/admin/dashboard";

/// Admin login page
pub const LOGIN_PATH: &str = "/admin/login";

/// Cookie carrying the admin auth token
pub const DEFAULT_AUTH_COOKIE: &str = "token";

/// Outcome of evaluating the gate for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Send the client elsewhere
    Redirect { target: String },
    /// Serve the request unmodified
    PassThrough,
}

impl GateDecision {
    pub fn redirect(target: impl Into<String>) -> Self {
        GateDecision::Redirect {
            target: target.into(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GateDecision::Redirect { .. })
    }
}

/// Which paths the gate watches and where credentials come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub dashboard_root: String,
    pub login_path: String,
    pub cookie_name: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dashboard_root: DASHBOARD_ROOT.to_string(),
            login_path: LOGIN_PATH.to_string(),
            cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
        }
    }
}

impl GateConfig {
    pub fn with_cookie_name(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ..Self::default()
        }
    }
}
