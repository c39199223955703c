use std::sync::Arc;

use dashmap::DashMap;

use super::osint::LookupKind;

/// Pending-input markers for the button-driven flow: after a user taps a
/// lookup button, the next free-text message in that chat is consumed as the
/// lookup argument. At most one marker per chat.
#[derive(Clone, Debug, Default)]
pub struct SessionService {
    pending: Arc<DashMap<i64, LookupKind>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, chat_id: i64, kind: LookupKind) {
        self.pending.insert(chat_id, kind);
    }

    /// Consumes the marker, if any.
    pub fn take(&self, chat_id: i64) -> Option<LookupKind> {
        self.pending.remove(&chat_id).map(|(_, kind)| kind)
    }

    pub fn clear(&self, chat_id: i64) {
        self.pending.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_the_marker() {
        let sessions = SessionService::new();
        sessions.set(10, LookupKind::Pincode);

        assert_eq!(sessions.take(10), Some(LookupKind::Pincode));
        assert_eq!(sessions.take(10), None);
    }

    #[test]
    fn last_marker_wins() {
        let sessions = SessionService::new();
        sessions.set(10, LookupKind::Number);
        sessions.set(10, LookupKind::Aadhaar);

        assert_eq!(sessions.take(10), Some(LookupKind::Aadhaar));
    }

    #[test]
    fn clear_discards_without_returning() {
        let sessions = SessionService::new();
        sessions.set(10, LookupKind::Vehicle);
        sessions.clear(10);

        assert_eq!(sessions.take(10), None);
    }
}
