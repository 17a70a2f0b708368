//! ============================================================================
//! Access Gate - Redirect rules for the admin route tree
//! ============================================================================
//! Rules, first match wins:
//! 1. dashboard tree without a credential  -> redirect to login
//! 2. login page with a credential         -> redirect to dashboard root
//! 3. anything else                        -> pass through
//!
//! The gate decides on credential PRESENCE only. It is a routing
//! convenience, not an authentication boundary: token verification
//! (signature, expiry, revocation) belongs to an identity provider that
//! this crate does not implement.
//! ============================================================================

use tracing::debug;

use super::credential::resolve_credential;
use super::types::{GateConfig, GateDecision};

/// True when a credential was supplied with at least one non-whitespace
/// character. An empty or whitespace-only value counts as absent, so
/// `token=%20%20` does not open the dashboard. Says nothing about validity.
pub fn has_credential_present(credential: Option<&str>) -> bool {
    credential.is_some_and(|c| !c.trim().is_empty())
}

/// Stateless per-request gate
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Dashboard root itself or anything below it
    pub fn is_protected(&self, path: &str) -> bool {
        let root = self.config.dashboard_root.trim_end_matches('/');
        match path.strip_prefix(root) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn is_login(&self, path: &str) -> bool {
        path == self.config.login_path
    }

    /// Decide for a path and an already-extracted credential
    pub fn evaluate(&self, path: &str, credential: Option<&str>) -> GateDecision {
        let present = has_credential_present(credential);

        if self.is_protected(path) && !present {
            debug!("No credential for {}, redirecting to {}", path, self.config.login_path);
            return GateDecision::redirect(self.config.login_path.clone());
        }

        if self.is_login(path) && present {
            debug!(
                "Credential present on login page, redirecting to {}",
                self.config.dashboard_root
            );
            return GateDecision::redirect(self.config.dashboard_root.clone());
        }

        GateDecision::PassThrough
    }

    /// Decide from raw `Cookie` and `Authorization` header values
    pub fn evaluate_request(
        &self,
        path: &str,
        cookie_header: Option<&str>,
        authorization: Option<&str>,
    ) -> GateDecision {
        let credential = resolve_credential(cookie_header, authorization, &self.config.cookie_name);
        self.evaluate(path, credential.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AccessGate {
        AccessGate::default()
    }

    #[test]
    fn test_protected_without_credential_redirects_to_login() {
        assert_eq!(
            gate().evaluate("/admin/dashboard/anything", None),
            GateDecision::redirect("/admin/login")
        );
        assert_eq!(
            gate().evaluate("/admin/dashboard", None),
            GateDecision::redirect("/admin/login")
        );
    }

    #[test]
    fn test_protected_with_credential_passes() {
        assert_eq!(
            gate().evaluate("/admin/dashboard/anything", Some("abc")),
            GateDecision::PassThrough
        );
    }

    #[test]
    fn test_login_with_credential_redirects_to_dashboard() {
        assert_eq!(
            gate().evaluate("/admin/login", Some("abc")),
            GateDecision::redirect("/admin/dashboard")
        );
    }

    #[test]
    fn test_login_without_credential_passes() {
        assert_eq!(gate().evaluate("/admin/login", None), GateDecision::PassThrough);
    }

    #[test]
    fn test_unmatched_paths_pass() {
        let gate = gate();
        assert_eq!(gate.evaluate("/public/home", None), GateDecision::PassThrough);
        assert_eq!(gate.evaluate("/public/home", Some("abc")), GateDecision::PassThrough);
        assert_eq!(gate.evaluate("/admin/dashboards", None), GateDecision::PassThrough);
        assert_eq!(gate.evaluate("/admin/login/help", Some("abc")), GateDecision::PassThrough);
    }

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(!has_credential_present(Some("   ")));
        assert!(!has_credential_present(None));
        assert!(has_credential_present(Some("not-even-a-jwt")));
        assert!(gate().evaluate("/admin/dashboard/bookings", Some("")).is_redirect());
        assert!(gate().evaluate("/admin/dashboard/bookings", Some(" \t ")).is_redirect());
        assert_eq!(gate().evaluate("/admin/login", Some("  ")), GateDecision::PassThrough);
    }

    #[test]
    fn test_evaluate_request_reads_headers() {
        let gate = gate();
        assert_eq!(
            gate.evaluate_request("/admin/dashboard/hotels", Some("token=abc"), None),
            GateDecision::PassThrough
        );
        assert_eq!(
            gate.evaluate_request("/admin/dashboard/hotels", None, Some("Bearer abc")),
            GateDecision::PassThrough
        );
        assert_eq!(
            gate.evaluate_request("/admin/login", None, Some("Bearer abc")),
            GateDecision::redirect("/admin/dashboard")
        );
        assert!(gate
            .evaluate_request("/admin/dashboard/hotels", None, Some("Basic abc"))
            .is_redirect());
    }

    #[test]
    fn test_custom_cookie_name() {
        let gate = AccessGate::new(GateConfig::with_cookie_name("admin_session"));
        assert_eq!(
            gate.evaluate_request("/admin/dashboard", Some("admin_session=xyz"), None),
            GateDecision::PassThrough
        );
        assert!(gate
            .evaluate_request("/admin/dashboard", Some("token=xyz"), None)
            .is_redirect());
    }
}
