use axum::http::Uri;

/// Where to land after login when no usable `next` was given.
pub const DEFAULT_AFTER_LOGIN: &str = "/";

/// Login URL that brings the user back to `uri` afterwards.
pub fn login_url_for(uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(DEFAULT_AFTER_LOGIN);

    login_url_with_next(Some(target))
}

pub fn login_url_with_next(next: Option<&str>) -> String {
    match next.and_then(safe_next) {
        Some(next) if next != DEFAULT_AFTER_LOGIN => {
            format!("/login?next={}", urlencoding::encode(next))
        }
        _ => "/login".to_string(),
    }
}

/// Accepts only local absolute ASCII paths so `next` cannot send the user to
/// another host and always fits in a `Location` header. Returns `None` for
/// anything else.
pub fn safe_next(next: &str) -> Option<&str> {
    let next = next.trim();

    if !next.starts_with('/') || next.starts_with("//") || next.starts_with("/\\") {
        return None;
    }
    if !next.is_ascii() || next.contains('\\') || next.chars().any(char::is_control) {
        return None;
    }

    let path = next.split(['?', '#']).next().unwrap_or(next);
    if path == "/login" || path == "/logout" {
        return None;
    }

    Some(next)
}

/// Resolves the post-login destination.
pub fn after_login_target(next: Option<&str>) -> String {
    next.and_then(safe_next)
        .unwrap_or(DEFAULT_AFTER_LOGIN)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_paths_are_kept() {
        assert_eq!(safe_next("/edit/3"), Some("/edit/3"));
        assert_eq!(safe_next("/dashboard?week=1"), Some("/dashboard?week=1"));
        assert_eq!(after_login_target(Some("/add")), "/add");
    }

    #[test]
    fn test_external_targets_are_rejected() {
        for target in [
            "https://evil.example.com",
            "//evil.example.com",
            "/\\evil.example.com",
            "javascript:alert(1)",
            "evil.example.com/path",
            "/ok\r\nLocation: https://evil.example.com",
            "",
        ] {
            assert_eq!(safe_next(target), None, "{target:?} should be rejected");
            assert_eq!(after_login_target(Some(target)), DEFAULT_AFTER_LOGIN);
        }
    }

    #[test]
    fn test_non_ascii_targets_are_rejected() {
        assert_eq!(safe_next("/\u{e9}"), None);
        assert_eq!(after_login_target(Some("/runs/\u{1f3c3}")), DEFAULT_AFTER_LOGIN);
        assert_eq!(login_url_with_next(Some("/\u{e9}")), "/login");
        // Already percent-encoded input stays usable
        assert_eq!(safe_next("/edit/3?note=%C3%A9"), Some("/edit/3?note=%C3%A9"));
    }

    #[test]
    fn test_login_pages_are_not_targets() {
        assert_eq!(safe_next("/login"), None);
        assert_eq!(safe_next("/logout?x=1"), None);
    }

    #[test]
    fn test_login_url_encodes_next() {
        let uri: Uri = "/edit/3?from=list".parse().unwrap();
        assert_eq!(login_url_for(&uri), "/login?next=%2Fedit%2F3%3Ffrom%3Dlist");

        let root: Uri = "/".parse().unwrap();
        assert_eq!(login_url_for(&root), "/login");

        assert_eq!(login_url_with_next(Some("https://evil.example.com")), "/login");
        assert_eq!(login_url_with_next(None), "/login");
    }
}
