use serde::{Deserialize, Serialize};

/// Connection lifecycle of one ingest session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
}

impl SessionState {
    /// Connected -> Connected is a reconnect and is allowed
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, target),
            (Disconnected, Connected) | (Connected, Connected) | (Connected, Disconnected)
        )
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connected => "Connected",
        }
    }
}
