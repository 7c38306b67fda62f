//! Pages, routes and the navigator seam.
//!
//! A route is written the way the web front-end wrote locations:
//! `auth?redirect=profile`. The gateway only needs the current path and
//! a way to go somewhere else; everything else parses routes.

use std::fmt;

/// Query parameter carrying the page to return to after sign-in
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    SignIn,
    Register,
    Profile,
    Admin,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::SignIn,
        Page::Register,
        Page::Profile,
        Page::Admin,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "index",
            Page::SignIn => "auth",
            Page::Register => "register",
            Page::Profile => "profile",
            Page::Admin => "admin",
        }
    }

    /// Parse a path, tolerating a leading slash and an `.html` suffix.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim().trim_start_matches('/');
        let name = trimmed.strip_suffix(".html").unwrap_or(trimmed);
        match name {
            "" | "index" => Some(Page::Home),
            "auth" => Some(Page::SignIn),
            "register" => Some(Page::Register),
            "profile" => Some(Page::Profile),
            "admin" => Some(Page::Admin),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::SignIn => "Sign in",
            Page::Register => "Join the club",
            Page::Profile => "Profile",
            Page::Admin => "Admin",
        }
    }

    /// Pages that cannot be shown without a session token
    pub fn requires_token(&self) -> bool {
        matches!(self, Page::Profile | Page::Admin)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A page plus an optional page to return to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub page: Page,
    pub redirect: Option<Page>,
}

impl Route {
    pub fn to(page: Page) -> Self {
        Self {
            page,
            redirect: None,
        }
    }

    /// The sign-in page, returning to `from` afterwards
    pub fn sign_in_from(from: Page) -> Self {
        Self {
            page: Page::SignIn,
            redirect: Some(from).filter(|p| *p != Page::SignIn),
        }
    }

    /// Parse `page?redirect=other`. Unknown pages fall back to Home;
    /// unknown redirect targets are dropped.
    pub fn parse(href: &str) -> Self {
        let (path, query) = match href.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (href, None),
        };
        let page = Page::from_path(path).unwrap_or(Page::Home);
        let redirect = query.and_then(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(k, _)| *k == REDIRECT_PARAM)
                .and_then(|(_, v)| Page::from_path(v))
        });
        Self { page, redirect }
    }

    pub fn href(&self) -> String {
        match self.redirect {
            Some(target) => format!("{}?{}={}", self.page.path(), REDIRECT_PARAM, target.path()),
            None => self.page.path().to_string(),
        }
    }

    /// Where to go once sign-in succeeds
    pub fn after_sign_in(&self) -> Page {
        match self.redirect {
            Some(Page::SignIn) | None => Page::Home,
            Some(page) => page,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.href())
    }
}

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    /// Path of the current location, e.g. `profile`
    fn current_path(&self) -> String;

    /// Go to `href`, e.g. `auth?redirect=profile`
    fn navigate(&self, href: &str);
}

/// Navigator for headless use: always "on" a fixed page, ignores redirects.
pub struct DetachedNavigator {
    page: Page,
}

impl DetachedNavigator {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

impl Default for DetachedNavigator {
    fn default() -> Self {
        Self::new(Page::Home)
    }
}

impl Navigator for DetachedNavigator {
    fn current_path(&self) -> String {
        self.page.path().to_string()
    }

    fn navigate(&self, href: &str) {
        tracing::debug!(href, "Navigation requested without a front-end, ignoring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths_roundtrip() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
    }

    #[test]
    fn test_page_from_path_variants() {
        assert_eq!(Page::from_path("/admin.html"), Some(Page::Admin));
        assert_eq!(Page::from_path(""), Some(Page::Home));
        assert_eq!(Page::from_path("index.html"), Some(Page::Home));
        assert_eq!(Page::from_path("settings"), None);
    }

    #[test]
    fn test_route_parse_with_redirect() {
        let route = Route::parse("auth?redirect=profile");
        assert_eq!(route.page, Page::SignIn);
        assert_eq!(route.redirect, Some(Page::Profile));
        assert_eq!(route.href(), "auth?redirect=profile");
    }

    #[test]
    fn test_route_parse_ignores_unknown_redirect() {
        let route = Route::parse("auth?lang=en&redirect=nowhere");
        assert_eq!(route.page, Page::SignIn);
        assert_eq!(route.redirect, None);
    }

    #[test]
    fn test_after_sign_in_defaults_home() {
        assert_eq!(Route::parse("auth").after_sign_in(), Page::Home);
        assert_eq!(Route::parse("auth?redirect=admin.html").after_sign_in(), Page::Admin);
        assert_eq!(Route::parse("auth?redirect=auth").after_sign_in(), Page::Home);
    }

    #[test]
    fn test_sign_in_from_drops_self_redirect() {
        assert_eq!(Route::sign_in_from(Page::SignIn).redirect, None);
        assert_eq!(Route::sign_in_from(Page::Admin).href(), "auth?redirect=admin");
    }
}
