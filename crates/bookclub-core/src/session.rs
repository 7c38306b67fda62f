//! Per-screen session context.
//!
//! Holds what one screen visit knows about the user: the last fetched
//! profile, the identifier a code was sent to, and the resend countdown.
//! Navigating to another page resets it.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Identifier, UserProfile};

/// Seconds before another code can be requested
pub const RESEND_COOLDOWN_SECS: i64 = 60;

/// Countdown gating "send code again"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResendCooldown {
    started_at: Option<DateTime<Utc>>,
}

impl ResendCooldown {
    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.started_at = None;
    }

    /// Whole seconds left, zero once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> i64 {
        match self.started_at {
            Some(start) => {
                let elapsed = now - start;
                let left = Duration::seconds(RESEND_COOLDOWN_SECS) - elapsed;
                // Round up so the display never shows 0 while still blocked
                let millis = left.num_milliseconds().max(0);
                (millis + 999) / 1000
            }
            None => 0,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining_at(now) > 0
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageSession {
    pub current_user: Option<UserProfile>,
    pub pending_identifier: Option<Identifier>,
    pub cooldown: ResendCooldown,
}

impl PageSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything, as when leaving the page
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_user(&mut self, user: UserProfile) {
        self.current_user = Some(user);
    }

    /// Forget the user, e.g. after a 401 or sign-out
    pub fn clear_user(&mut self) {
        self.current_user = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(UserProfile::is_admin)
    }

    /// Label for the navigation bar
    pub fn display_name(&self) -> Option<&str> {
        self.current_user.as_ref().map(UserProfile::display_name)
    }

    /// Remember where the code went and start the resend countdown
    pub fn code_sent(&mut self, identifier: Identifier) {
        self.pending_identifier = Some(identifier);
        self.cooldown.start();
    }

    /// Back to the identifier step
    pub fn change_identifier(&mut self) {
        self.pending_identifier = None;
        self.cooldown.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> UserProfile {
        serde_json::from_value(serde_json::json!({
            "id": 1, "first_name": "Anna", "email": "anna@example.com", "role": role
        }))
        .unwrap()
    }

    #[test]
    fn test_cooldown_counts_down() {
        let start = Utc::now();
        let mut cooldown = ResendCooldown::default();
        assert_eq!(cooldown.remaining_at(start), 0);

        cooldown.start_at(start);
        assert_eq!(cooldown.remaining_at(start), 60);
        assert_eq!(cooldown.remaining_at(start + Duration::milliseconds(500)), 60);
        assert_eq!(cooldown.remaining_at(start + Duration::seconds(59)), 1);
        assert!(!cooldown.is_active_at(start + Duration::seconds(60)));
        assert_eq!(cooldown.remaining_at(start + Duration::seconds(90)), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = PageSession::new();
        session.set_user(user("admin"));
        session.code_sent(Identifier::Email("anna@example.com".to_string()));
        assert!(session.is_admin());
        assert!(session.cooldown.is_active());

        session.reset();
        assert!(!session.is_signed_in());
        assert!(session.pending_identifier.is_none());
        assert!(!session.cooldown.is_active());
    }

    #[test]
    fn test_display_name_and_roles() {
        let mut session = PageSession::new();
        assert_eq!(session.display_name(), None);
        session.set_user(user("user"));
        assert_eq!(session.display_name(), Some("Anna"));
        assert!(!session.is_admin());
        session.clear_user();
        assert!(!session.is_signed_in());
    }
}
