//! Route guarding: which view to show for a navigation request.
//!
//! The decision function is pure. The host router calls it on every
//! navigation and on every session transition, so a session invalidated
//! mid-use re-routes away from protected views immediately.

use crate::auth::SessionState;

/// The application's navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Issues,
    IssueNew,
    IssueEdit(i64),
    Analytics,
}

impl View {
    /// Views reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, View::Login | View::Register)
    }

    /// The path this view lives at.
    pub fn path(&self) -> String {
        match self {
            View::Login => "/login".to_string(),
            View::Register => "/register".to_string(),
            View::Dashboard => "/dashboard".to_string(),
            View::Issues => "/issues".to_string(),
            View::IssueNew => "/issues/new".to_string(),
            View::IssueEdit(id) => format!("/issues/{}/edit", id),
            View::Analytics => "/analytics".to_string(),
        }
    }

    /// Resolve a path to a view. The root path resolves to the dashboard,
    /// so guarding it yields the usual dashboard-or-login redirect.
    pub fn from_path(path: &str) -> Option<View> {
        match path.trim_end_matches('/') {
            "" => Some(View::Dashboard),
            "/login" => Some(View::Login),
            "/register" => Some(View::Register),
            "/dashboard" => Some(View::Dashboard),
            "/issues" => Some(View::Issues),
            "/issues/new" => Some(View::IssueNew),
            "/analytics" => Some(View::Analytics),
            other => {
                let rest = other.strip_prefix("/issues/")?;
                let id = rest.strip_suffix("/edit")?;
                id.parse().ok().map(View::IssueEdit)
            }
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show the requested view.
    Render(View),
    /// Navigate somewhere else instead.
    Redirect(View),
    /// Session state is not resolved yet; show a neutral loading
    /// indicator rather than guessing a redirect.
    Loading,
}

/// Decide what to do with a navigation request given the current session
/// state.
pub fn decide(state: &SessionState, requested: View) -> RouteDecision {
    match state {
        SessionState::Loading => RouteDecision::Loading,
        SessionState::Authenticated(_) if requested.is_public() => {
            RouteDecision::Redirect(View::Dashboard)
        }
        SessionState::Anonymous if !requested.is_public() => RouteDecision::Redirect(View::Login),
        _ => RouteDecision::Render(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::models::UserProfile;

    fn authenticated() -> SessionState {
        SessionState::Authenticated(Credential {
            token: "t1".to_string(),
            user: UserProfile {
                id: 1,
                username: "bob".to_string(),
                full_name: "Bob Example".to_string(),
                email: "bob@example.com".to_string(),
                roles: vec![],
            },
        })
    }

    #[test]
    fn anonymous_is_redirected_to_login_from_protected_views() {
        let requested = View::from_path("/dashboard").unwrap();
        assert_eq!(
            decide(&SessionState::Anonymous, requested),
            RouteDecision::Redirect(View::Login)
        );
        assert_eq!(
            decide(&SessionState::Anonymous, View::Analytics),
            RouteDecision::Redirect(View::Login)
        );
    }

    #[test]
    fn authenticated_is_redirected_to_dashboard_from_public_views() {
        let requested = View::from_path("/login").unwrap();
        assert_eq!(
            decide(&authenticated(), requested),
            RouteDecision::Redirect(View::Dashboard)
        );
        assert_eq!(
            decide(&authenticated(), View::Register),
            RouteDecision::Redirect(View::Dashboard)
        );
    }

    #[test]
    fn matching_state_renders_the_requested_view() {
        assert_eq!(
            decide(&authenticated(), View::Issues),
            RouteDecision::Render(View::Issues)
        );
        assert_eq!(
            decide(&SessionState::Anonymous, View::Login),
            RouteDecision::Render(View::Login)
        );
    }

    #[test]
    fn loading_state_never_redirects() {
        assert_eq!(
            decide(&SessionState::Loading, View::Dashboard),
            RouteDecision::Loading
        );
        assert_eq!(
            decide(&SessionState::Loading, View::Login),
            RouteDecision::Loading
        );
    }

    #[test]
    fn root_path_resolves_to_dashboard() {
        assert_eq!(View::from_path("/"), Some(View::Dashboard));
        assert_eq!(
            decide(&SessionState::Anonymous, View::from_path("/").unwrap()),
            RouteDecision::Redirect(View::Login)
        );
        assert_eq!(
            decide(&authenticated(), View::from_path("/").unwrap()),
            RouteDecision::Render(View::Dashboard)
        );
    }

    #[test]
    fn paths_round_trip() {
        let views = [
            View::Login,
            View::Register,
            View::Dashboard,
            View::Issues,
            View::IssueNew,
            View::IssueEdit(42),
            View::Analytics,
        ];
        for view in views {
            assert_eq!(View::from_path(&view.path()), Some(view));
        }
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert_eq!(View::from_path("/nope"), None);
        assert_eq!(View::from_path("/issues/abc/edit"), None);
        assert_eq!(View::from_path("/issues/42/nope"), None);
    }
}
