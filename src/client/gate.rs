//! Route guards over the session state.
//!
//! The decision is synchronous on the current session value; there is no
//! intermediate loading state.

use super::session::Session;

/// Path of the sign-in screen, the target of the require-auth guard.
pub const SIGN_IN_PATH: &str = "/signin";

/// What a route guard decided for the current navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the guarded children.
    Render,
    /// Navigate to the given path instead.
    Redirect(String),
}

/// Require-auth guard: render when logged in, otherwise redirect to sign-in.
pub fn require_auth(session: &Session) -> RouteDecision {
    if session.is_logged_in {
        RouteDecision::Render
    } else {
        RouteDecision::Redirect(SIGN_IN_PATH.to_string())
    }
}

/// Redirect-if-auth guard: render when logged out, otherwise redirect to
/// the configured target (e.g. the home page from the sign-in screen).
pub fn redirect_if_auth(session: &Session, target: &str) -> RouteDecision {
    if session.is_logged_in {
        RouteDecision::Redirect(target.to_string())
    } else {
        RouteDecision::Render
    }
}
