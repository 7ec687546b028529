//! In-memory state of the touchscreen remote: active TV, admin mode, PIN entry.

pub mod ids;

use ids::TvSlot;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("TV toggle is locked; unlock admin mode to change the active TV")]
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Accepted { admin: bool },
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct RemoteSession {
    active: TvSlot,
    admin: bool,
    pin: String,
}

impl RemoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_slot(&self) -> TvSlot {
        self.active
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Switch to the other TV. Only allowed while admin mode is on.
    pub fn toggle_tv(&mut self) -> Result<TvSlot, SessionError> {
        if !self.admin {
            return Err(SessionError::Locked);
        }
        self.active = self.active.other();
        info!(slot = %self.active, "active TV changed");
        Ok(self.active)
    }

    pub fn toggle_admin(&mut self) -> bool {
        self.admin = !self.admin;
        info!(admin = self.admin, "admin mode toggled");
        self.admin
    }

    pub fn push_pin(&mut self, c: char) {
        self.pin.push(c);
    }

    pub fn pop_pin(&mut self) {
        self.pin.pop();
    }

    pub fn clear_pin(&mut self) {
        self.pin.clear();
    }

    /// Replace the buffer wholesale (text field input).
    pub fn set_pin(&mut self, value: String) {
        self.pin = value;
    }

    /// Compare the buffer against `password`.
    ///
    /// A match toggles admin mode, so entering the password while unlocked
    /// locks the remote again. The buffer is cleared either way.
    pub fn submit_pin(&mut self, password: &str) -> PinOutcome {
        let ok = self.pin == password;
        self.pin.clear();
        if ok {
            PinOutcome::Accepted {
                admin: self.toggle_admin(),
            }
        } else {
            debug!("admin password rejected");
            PinOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_tv_one_locked() {
        let s = RemoteSession::new();
        assert_eq!(s.active_slot(), TvSlot::One);
        assert!(!s.is_admin());
        assert_eq!(s.pin(), "");
    }

    #[test]
    fn toggle_tv_requires_admin() {
        let mut s = RemoteSession::new();
        assert_eq!(s.toggle_tv(), Err(SessionError::Locked));
        assert_eq!(s.active_slot(), TvSlot::One);

        s.toggle_admin();
        assert_eq!(s.toggle_tv(), Ok(TvSlot::Two));
        assert_eq!(s.active_slot().label(), "TV: 2");
        assert_eq!(s.toggle_tv(), Ok(TvSlot::One));
    }

    #[test]
    fn pin_editing() {
        let mut s = RemoteSession::new();
        for c in "1234".chars() {
            s.push_pin(c);
        }
        s.pop_pin();
        assert_eq!(s.pin(), "123");
        s.clear_pin();
        assert_eq!(s.pin(), "");
        s.pop_pin();
        assert_eq!(s.pin(), "");
    }

    #[test]
    fn wrong_pin_is_rejected_and_cleared() {
        let mut s = RemoteSession::new();
        s.set_pin("nope".into());
        assert_eq!(s.submit_pin("admin"), PinOutcome::Rejected);
        assert_eq!(s.pin(), "");
        assert!(!s.is_admin());
    }

    #[test]
    fn correct_pin_toggles_admin_both_ways() {
        let mut s = RemoteSession::new();
        s.set_pin("admin".into());
        assert_eq!(s.submit_pin("admin"), PinOutcome::Accepted { admin: true });
        assert!(s.is_admin());

        s.set_pin("admin".into());
        assert_eq!(s.submit_pin("admin"), PinOutcome::Accepted { admin: false });
        assert!(!s.is_admin());
    }

    #[test]
    fn slot_display() {
        assert_eq!(TvSlot::One.to_string(), "TV01");
        assert_eq!(TvSlot::Two.index(), 1);
    }
}
