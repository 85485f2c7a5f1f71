use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Create,
    Explore,
    Dashboard,
    SignIn,
    SignUp,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Create,
        Route::Explore,
        Route::Dashboard,
        Route::SignIn,
        Route::SignUp,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Create => "/create",
            Route::Explore => "/explore",
            Route::Dashboard => "/dashboard",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_active(&self, current_path: &str) -> bool {
        self.path() == current_path
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Moves the user between views. Controllers call this where the flow
/// demands a redirect (sign-in required, tale saved, signed out).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Go(Route),
    SignOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub action: NavAction,
}

const fn link(label: &'static str, route: Route) -> NavLink {
    NavLink {
        label,
        action: NavAction::Go(route),
    }
}

/// Navbar entries for the current session state.
pub fn nav_links(signed_in: bool) -> Vec<NavLink> {
    let mut links = vec![
        link("Home", Route::Home),
        link("Create", Route::Create),
        link("Explore", Route::Explore),
    ];

    if signed_in {
        links.push(link("Dashboard", Route::Dashboard));
        links.push(NavLink {
            label: "Sign Out",
            action: NavAction::SignOut,
        });
    } else {
        links.push(link("Sign In", Route::SignIn));
        links.push(link("Sign Up", Route::SignUp));
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(links: &[NavLink]) -> Vec<&'static str> {
        links.iter().map(|l| l.label).collect()
    }

    #[test]
    fn links_depend_on_session() {
        assert_eq!(
            labels(&nav_links(false)),
            vec!["Home", "Create", "Explore", "Sign In", "Sign Up"]
        );
        let signed_in = nav_links(true);
        assert_eq!(
            labels(&signed_in),
            vec!["Home", "Create", "Explore", "Dashboard", "Sign Out"]
        );
        assert_eq!(signed_in[4].action, NavAction::SignOut);
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nowhere"), None);
        assert!(Route::Home.is_active("/"));
        assert!(!Route::Home.is_active("/explore"));
    }
}
