//! Route table and the login guard in front of it.

use crate::gateway::LOGIN_ROUTE;
use crate::session::Session;

pub const HOME_ROUTE: &str = "/";
pub const DEFAULT_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Orders,
    OrderDetail(String),
    Products,
    Categories,
    Users,
    Reviews,
    /// Any path outside the table.
    NotFound(String),
}

impl Route {
    /// Match a path against the table. Query strings, fragments and trailing
    /// slashes are ignored. `/` is not a route of its own; it resolves to the
    /// dashboard.
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["dashboard"] => Self::Dashboard,
            ["login"] => Self::Login,
            ["orders"] => Self::Orders,
            ["orders", id] => Self::OrderDetail(id.to_string()),
            ["products"] => Self::Products,
            ["categories"] => Self::Categories,
            ["users"] => Self::Users,
            ["reviews"] => Self::Reviews,
            _ => Self::NotFound(path.to_string()),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_ROUTE.to_string(),
            Self::Dashboard => DEFAULT_ROUTE.to_string(),
            Self::Orders => "/orders".to_string(),
            Self::OrderDetail(id) => format!("/orders/{id}"),
            Self::Products => "/products".to_string(),
            Self::Categories => "/categories".to_string(),
            Self::Users => "/users".to_string(),
            Self::Reviews => "/reviews".to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(String),
}

/// Decide where a navigation to `path` ends up.
pub fn guard(path: &str, session: &Session) -> Navigation {
    let logged_in = session.is_logged_in();
    let route = Route::resolve(path);

    if route.requires_auth() && !logged_in {
        tracing::debug!(%path, "protected route while logged out");
        return Navigation::Redirect(Route::Login.path());
    }
    if route == Route::Login && logged_in {
        return Navigation::Redirect(HOME_ROUTE.to_string());
    }

    let bare = path.split(['?', '#']).next().unwrap_or_default();
    if bare.trim_matches('/').is_empty() {
        return Navigation::Redirect(Route::Dashboard.path());
    }
    Navigation::Proceed(route)
}
