//! ============================================================================
//! Access Module - Admin route gating
//! ============================================================================
//! Redirects between the admin dashboard tree and the admin login page based
//! on whether a credential is present. Presence is not verification.
//!
//! ## Usage
//! ```rust,ignore
//! use travel_core::access::{AccessGate, GateDecision};
//!
//! let gate = AccessGate::default();
//! match gate.evaluate_request(path, cookie_header, authorization_header) {
//!     GateDecision::Redirect { target } => { /* 307 to target */ }
//!     GateDecision::PassThrough => { /* serve */ }
//! }
//! ```
//! ============================================================================

mod credential;
mod gate;
mod types;

pub use credential::{
    credential_from_authorization, credential_from_cookie_header, resolve_credential,
};
pub use gate::{has_credential_present, AccessGate};
pub use types::{GateConfig, GateDecision, DASHBOARD_ROOT, DEFAULT_AUTH_COOKIE, LOGIN_PATH};
