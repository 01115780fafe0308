//! Session holder and screen router.
//!
//! At most one authenticated session exists at a time. The router is an
//! explicit value handed to whatever drives the UI, never ambient state.
//! States: anonymous, authenticated. Transitions: login, logout.

use thiserror::Error;

use crate::capability::{can_view, landing_screen, Screen};
use crate::model::User;

/// A signed-in user plus the screen they are looking at.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub screen: Screen,
}

/// Navigation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("{role} accounts cannot view the {screen} screen")]
    Forbidden {
        role: crate::model::Role,
        screen: Screen,
    },
}

/// Holds the current screen and (at most one) session.
#[derive(Debug, Clone)]
pub struct Router {
    session: Option<Session>,
    anonymous_screen: Screen,
}

impl Router {
    /// A fresh router: anonymous, on the home screen.
    pub fn new() -> Self {
        Self {
            session: None,
            anonymous_screen: Screen::Home,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn current_screen(&self) -> Screen {
        match &self.session {
            Some(session) => session.screen,
            None => self.anonymous_screen,
        }
    }

    /// Anonymous → authenticated. Routes to the role's landing screen.
    pub fn login(&mut self, user: User) -> Screen {
        let screen = landing_screen(user.role);
        self.session = Some(Session { user, screen });
        screen
    }

    /// Authenticated → anonymous. Clears the session, back to home.
    pub fn logout(&mut self) {
        self.session = None;
        self.anonymous_screen = Screen::Home;
    }

    /// Replace the session user in place (after a profile mutation), keeping
    /// the current screen.
    pub fn refresh_user(&mut self, user: User) {
        if let Some(session) = &mut self.session {
            session.user = user;
        }
    }

    /// Move to another screen, enforcing the capability check.
    pub fn navigate(&mut self, screen: Screen) -> Result<Screen, NavigationError> {
        match &mut self.session {
            Some(session) => {
                if can_view(session.user.role, screen) {
                    session.screen = screen;
                    Ok(screen)
                } else {
                    Err(NavigationError::Forbidden {
                        role: session.user.role,
                        screen,
                    })
                }
            }
            None if screen.is_public() => {
                self.anonymous_screen = screen;
                Ok(screen)
            }
            None => Err(NavigationError::NotSignedIn),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
