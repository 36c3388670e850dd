//! Edge route protection.
//!
//! The decision over {path class, cookie presence, validation result}
//! is a pure, explicitly ordered list so its precedence is unambiguous
//! and testable. The upstream who-am-I call and the HTTP plumbing live
//! in [`validator`] and [`middleware`].

pub mod middleware;
pub mod validator;

pub use middleware::RouteGuard;
pub use validator::{HttpSessionValidator, SessionValidator};

pub const LOGIN_PATH: &str = "/login";
pub const CHAT_PATH: &str = "/chat";

const PROTECTED_PREFIXES: &[&str] = &["/chat", "/chats"];

/// What kind of path a request targets, as far as protection rules
/// are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Protected,
    Login,
    Root,
    Public,
}

impl PathClass {
    pub fn classify(path: &str) -> Self {
        if path == "/" {
            return PathClass::Root;
        }
        if path == LOGIN_PATH {
            return PathClass::Login;
        }
        if PROTECTED_PREFIXES
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
        {
            return PathClass::Protected;
        }
        PathClass::Public
    }
}

/// Outcome of the upstream session check. "Session rejected" and
/// "backend unreachable" stay distinguishable up to the decision
/// point; the decision maps both to the same redirect, but the tag
/// is available for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    Invalid,
    UpstreamError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin { clear_cookie: bool },
    RedirectToChat,
}

/// The ordered decision list; the first matching rule governs.
///
/// `check` is `Some` exactly when the caller performed the upstream
/// validation, i.e. for a protected path with a cookie present.
pub fn decide(class: PathClass, cookie_present: bool, check: Option<SessionCheck>) -> RouteDecision {
    // 1. Protected path with a cookie the backend rejected, or a
    //    check that never completed: clear the stale cookie and send
    //    the user to login. A backend outage logs everyone out rather
    //    than failing open.
    if class == PathClass::Protected && cookie_present {
        match check {
            Some(SessionCheck::Valid) => return RouteDecision::Allow,
            Some(SessionCheck::Invalid) | Some(SessionCheck::UpstreamError) | None => {
                return RouteDecision::RedirectToLogin { clear_cookie: true }
            }
        }
    }

    // 2. Unauthenticated users can't sit on protected paths or the root.
    if (class == PathClass::Protected || class == PathClass::Root) && !cookie_present {
        return RouteDecision::RedirectToLogin {
            clear_cookie: false,
        };
    }

    // 3. Authenticated users are bounced away from login and the root.
    if (class == PathClass::Login || class == PathClass::Root) && cookie_present {
        return RouteDecision::RedirectToChat;
    }

    // 4. Everything else proceeds unmodified.
    RouteDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PathClass::classify("/"), PathClass::Root);
        assert_eq!(PathClass::classify("/login"), PathClass::Login);
        assert_eq!(PathClass::classify("/chat"), PathClass::Protected);
        assert_eq!(PathClass::classify("/chat/abc123"), PathClass::Protected);
        assert_eq!(PathClass::classify("/chats"), PathClass::Protected);
        assert_eq!(PathClass::classify("/chats/1/messages"), PathClass::Protected);
        assert_eq!(PathClass::classify("/auth/login"), PathClass::Public);
        assert_eq!(PathClass::classify("/health"), PathClass::Public);
        // Prefix match is segment-aware.
        assert_eq!(PathClass::classify("/chatter"), PathClass::Public);
    }

    #[test]
    fn test_protected_no_cookie_redirects_to_login() {
        assert_eq!(
            decide(PathClass::Protected, false, None),
            RouteDecision::RedirectToLogin {
                clear_cookie: false
            }
        );
    }

    #[test]
    fn test_protected_valid_cookie_allows() {
        assert_eq!(
            decide(PathClass::Protected, true, Some(SessionCheck::Valid)),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_protected_rejected_cookie_clears_and_redirects() {
        assert_eq!(
            decide(PathClass::Protected, true, Some(SessionCheck::Invalid)),
            RouteDecision::RedirectToLogin { clear_cookie: true }
        );
    }

    #[test]
    fn test_backend_outage_behaves_like_rejection() {
        assert_eq!(
            decide(PathClass::Protected, true, Some(SessionCheck::UpstreamError)),
            RouteDecision::RedirectToLogin { clear_cookie: true }
        );
    }

    #[test]
    fn test_login_with_cookie_redirects_to_chat() {
        assert_eq!(
            decide(PathClass::Login, true, None),
            RouteDecision::RedirectToChat
        );
    }

    #[test]
    fn test_root_follows_cookie_presence() {
        assert_eq!(
            decide(PathClass::Root, false, None),
            RouteDecision::RedirectToLogin {
                clear_cookie: false
            }
        );
        assert_eq!(
            decide(PathClass::Root, true, None),
            RouteDecision::RedirectToChat
        );
    }

    #[test]
    fn test_public_paths_always_allow() {
        assert_eq!(decide(PathClass::Public, false, None), RouteDecision::Allow);
        assert_eq!(decide(PathClass::Public, true, None), RouteDecision::Allow);
    }

    #[test]
    fn test_login_without_cookie_allows() {
        assert_eq!(decide(PathClass::Login, false, None), RouteDecision::Allow);
    }
}
