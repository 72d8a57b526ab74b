//! Session - explicit user identity handle
//!
//! Populated once at startup (or after login) and passed into every service
//! that needs the user id. No component performs an ambient storage lookup.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    user_id: u64,
}

impl Session {
    pub fn new(user_id: u64) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }
}
