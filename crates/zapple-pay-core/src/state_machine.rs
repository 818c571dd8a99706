use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Pending,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// The service issued an authorization request.
    Created,
    /// A status poll came back truthy.
    Approved,
    /// A status poll came back falsy or failed.
    NotConnected,
    /// The consumer went away or switched to a manual connection.
    Teardown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal session transition: {action:?} from {from:?}")]
    Illegal {
        from: SessionState,
        action: SessionAction,
    },
}

pub fn session_transition(
    from: SessionState,
    action: SessionAction,
) -> Result<(SessionState, StateTransition), TransitionError> {
    use SessionAction as A;
    use SessionState as S;

    let (to, reason) = match (from, action) {
        (S::Idle, A::Created) => (S::Pending, "authorization created"),
        (S::Idle, A::Teardown) => (S::Idle, "already idle"),
        (S::Pending, A::Approved) => (S::Connected, "wallet approved"),
        (S::Pending, A::NotConnected) => (S::Pending, "awaiting approval"),
        (S::Connected, A::Approved) => (S::Connected, "still connected"),
        (S::Connected, A::NotConnected) => (S::Pending, "approval regressed"),
        (S::Pending | S::Connected, A::Teardown) => (S::Idle, "session torn down"),
        _ => return Err(TransitionError::Illegal { from, action }),
    };

    Ok((to, StateTransition { from, to, reason }))
}
