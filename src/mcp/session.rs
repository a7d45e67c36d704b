//! Session handshake state
//!
//! A session starts `Uninitialized` and moves to `Initialized` exactly once,
//! on `notifications/initialized`. There is no way back short of restarting
//! the process. The flag and the negotiated protocol version are safe to
//! share across tasks.

use super::types::JsonRpcError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Observable handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
}

/// Process-wide session for one serving loop
#[derive(Debug)]
pub struct Session {
    initialized: AtomicBool,
    protocol_version: Mutex<String>,
}

impl Session {
    /// Create an uninitialized session that falls back to `default_version`
    pub fn new(default_version: impl Into<String>) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            protocol_version: Mutex::new(default_version.into()),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.initialized.load(Ordering::Acquire) {
            SessionState::Initialized
        } else {
            SessionState::Uninitialized
        }
    }

    /// The protocol version currently in effect
    pub fn protocol_version(&self) -> String {
        self.protocol_version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Record the client's requested version and return the one in effect
    ///
    /// A non-blank request replaces the current version; a blank or absent
    /// one keeps it. Negotiation never changes [`SessionState`].
    pub fn negotiate(&self, requested: Option<&str>) -> String {
        let mut current = self
            .protocol_version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(version) = requested.map(str::trim).filter(|v| !v.is_empty()) {
            *current = version.to_string();
        }
        current.clone()
    }

    /// Complete the handshake; returns `true` only for the first call
    pub fn mark_initialized(&self) -> bool {
        !self.initialized.swap(true, Ordering::AcqRel)
    }

    /// Gate for `tools/list` and `tools/call`
    ///
    /// # Errors
    ///
    /// Returns the `-32002` protocol error while uninitialized.
    pub fn require_initialized(&self) -> Result<(), JsonRpcError> {
        match self.state() {
            SessionState::Initialized => Ok(()),
            SessionState::Uninitialized => Err(JsonRpcError::server_not_initialized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_uninitialized() {
        let session = Session::new("2025-11-25");
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.protocol_version(), "2025-11-25");
    }

    #[test]
    fn test_mark_initialized_is_one_way_and_idempotent() {
        let session = Session::new("2025-11-25");
        assert!(session.mark_initialized());
        assert!(!session.mark_initialized());
        assert_eq!(session.state(), SessionState::Initialized);
    }

    #[test]
    fn test_negotiate_uses_requested_version() {
        let session = Session::new("2025-11-25");
        assert_eq!(session.negotiate(Some("2024-01-01")), "2024-01-01");
        assert_eq!(session.protocol_version(), "2024-01-01");
    }

    #[test]
    fn test_negotiate_blank_keeps_current() {
        let session = Session::new("2025-11-25");
        assert_eq!(session.negotiate(None), "2025-11-25");
        assert_eq!(session.negotiate(Some("   ")), "2025-11-25");
    }

    #[test]
    fn test_negotiated_version_survives_later_blank_request() {
        let session = Session::new("2025-11-25");
        session.negotiate(Some("2025-03-26"));
        assert_eq!(session.negotiate(None), "2025-03-26");
        assert_eq!(session.negotiate(Some("")), "2025-03-26");
    }

    #[test]
    fn test_negotiate_does_not_initialize() {
        let session = Session::new("2025-11-25");
        session.negotiate(Some("2025-03-26"));
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_require_initialized_gates() {
        let session = Session::new("2025-11-25");
        let err = session.require_initialized().unwrap_err();
        assert_eq!(err.code, -32002);

        session.mark_initialized();
        assert!(session.require_initialized().is_ok());
    }
}
