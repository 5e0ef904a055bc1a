// Identity issued by the config service for performance reporting.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_id: String,
    pub player_id: String,
}

impl SessionIdentity {
    pub fn new(session_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            player_id: player_id.into(),
        }
    }

    /// Reports can only be addressed when the service issued a session id.
    pub fn is_reportable(&self) -> bool {
        !self.session_id.trim().is_empty()
    }
}
