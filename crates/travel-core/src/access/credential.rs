//! ============================================================================
//! Credential Extraction - Auth token from cookie or bearer header
//! ============================================================================
//! Only extracts. Nothing here checks a signature, expiry or revocation;
//! a non-empty token is all the gate ever sees.
//! ============================================================================

use percent_encoding::percent_decode_str;

const BEARER_SCHEME: &str = "bearer";

/// Value of the named cookie from a raw `Cookie` header
pub fn credential_from_cookie_header(header: Option<&str>, cookie_name: &str) -> Option<String> {
    header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| {
            let value = value.trim().trim_matches('"');
            percent_decode_str(value).decode_utf8_lossy().into_owned()
        })
        .filter(|value| !value.trim().is_empty())
}

/// Token from an `Authorization: Bearer <token>` header.
/// Other schemes and empty tokens count as no credential.
pub fn credential_from_authorization(header: Option<&str>) -> Option<String> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Cookie first, then the bearer header
pub fn resolve_credential(
    cookie_header: Option<&str>,
    authorization: Option<&str>,
    cookie_name: &str,
) -> Option<String> {
    credential_from_cookie_header(cookie_header, cookie_name)
        .or_else(|| credential_from_authorization(authorization))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_lookup() {
        let header = Some("theme=dark; token=abc123; lang=en");
        assert_eq!(credential_from_cookie_header(header, "token"), Some("abc123".into()));
        assert_eq!(credential_from_cookie_header(header, "session"), None);
        assert_eq!(credential_from_cookie_header(None, "token"), None);
    }

    #[test]
    fn test_cookie_value_decoded() {
        let header = Some("token=a%20b%3Dc");
        assert_eq!(credential_from_cookie_header(header, "token"), Some("a b=c".into()));
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        assert_eq!(credential_from_cookie_header(Some("token="), "token"), None);
        assert_eq!(credential_from_cookie_header(Some("token=\"\""), "token"), None);
    }

    #[test]
    fn test_cookie_name_is_exact() {
        assert_eq!(credential_from_cookie_header(Some("xtoken=abc"), "token"), None);
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(credential_from_authorization(Some("Bearer abc")), Some("abc".into()));
        assert_eq!(credential_from_authorization(Some("bearer abc")), Some("abc".into()));
        assert_eq!(credential_from_authorization(Some("Bearer ")), None);
        assert_eq!(credential_from_authorization(Some("Bearer")), None);
        assert_eq!(credential_from_authorization(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(credential_from_authorization(None), None);
    }

    #[test]
    fn test_cookie_takes_precedence() {
        let resolved =
            resolve_credential(Some("token=from-cookie"), Some("Bearer from-header"), "token");
        assert_eq!(resolved, Some("from-cookie".into()));

        let resolved = resolve_credential(Some("other=1"), Some("Bearer from-header"), "token");
        assert_eq!(resolved, Some("from-header".into()));
    }
}
