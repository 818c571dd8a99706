//! Reconciles poll results against the held authorization request.
//!
//! This is the runtime-agnostic half of an authorization session: it decides
//! what a completed poll means, while the caller owns timers and I/O. Every
//! tick gets a [`PollTicket`] with a monotonically increasing sequence number
//! so that a slow response cannot overwrite a fresher one.

use tracing::{debug, info};

use crate::domain::{AuthToken, AuthorizationRequest, AuthorizationStatus};
use crate::state_machine::{
    session_transition, SessionAction, SessionState, StateTransition, TransitionError,
};

/// How completed polls are ordered against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollOrdering {
    /// Drop any response older than the newest one already applied.
    #[default]
    Latest,
    /// Apply responses in the order they arrive, stale or not.
    Arrival,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    pub sequence: u64,
    pub request_id: String,
}

/// What the consumer is told about the authorization token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TokenEmitted(AuthToken),
    TokenCleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Applied {
        transition: StateTransition,
        event: Option<SessionEvent>,
    },
    /// A fresher poll was applied first.
    Stale,
    /// The poll belongs to a request this session no longer holds.
    Orphaned,
}

#[derive(Debug)]
pub struct AuthorizationSession {
    state: SessionState,
    request: Option<AuthorizationRequest>,
    token: Option<AuthToken>,
    ordering: PollOrdering,
    next_sequence: u64,
    last_applied: Option<u64>,
    history: Vec<StateTransition>,
}

impl Default for AuthorizationSession {
    fn default() -> Self {
        Self::new(PollOrdering::default())
    }
}

impl AuthorizationSession {
    pub fn new(ordering: PollOrdering) -> Self {
        Self {
            state: SessionState::Idle,
            request: None,
            token: None,
            ordering,
            next_sequence: 1,
            last_applied: None,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> Option<&AuthorizationRequest> {
        self.request.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn ordering(&self) -> PollOrdering {
        self.ordering
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Idle -> Pending with a freshly created request.
    pub fn begin(
        &mut self,
        request: AuthorizationRequest,
    ) -> Result<StateTransition, TransitionError> {
        let transition = self.transition(SessionAction::Created)?;
        info!(id = %request.id, "wallet authorization pending");
        self.request = Some(request);
        self.token = None;
        self.last_applied = None;
        Ok(transition)
    }

    /// Hands out the next poll, or `None` when no request is held.
    pub fn issue_poll(&mut self) -> Option<PollTicket> {
        let request = self.request.as_ref()?;
        let ticket = PollTicket {
            sequence: self.next_sequence,
            request_id: request.id.clone(),
        };
        self.next_sequence += 1;
        Some(ticket)
    }

    pub fn apply_poll(
        &mut self,
        ticket: &PollTicket,
        status: AuthorizationStatus,
    ) -> Result<PollOutcome, TransitionError> {
        let held = match &self.request {
            Some(request) if request.id == ticket.request_id => request.token(),
            _ => {
                debug!(sequence = ticket.sequence, "dropping poll for released request");
                return Ok(PollOutcome::Orphaned);
            }
        };

        if self.ordering == PollOrdering::Latest
            && self.last_applied.map_or(false, |seq| seq >= ticket.sequence)
        {
            debug!(
                sequence = ticket.sequence,
                last_applied = ?self.last_applied,
                "dropping stale poll response"
            );
            return Ok(PollOutcome::Stale);
        }
        self.last_applied = Some(
            self.last_applied
                .map_or(ticket.sequence, |seq| seq.max(ticket.sequence)),
        );

        let transition = if status.is_connected() {
            self.transition(SessionAction::Approved)?
        } else {
            self.transition(SessionAction::NotConnected)?
        };

        let event = match (status.is_connected(), self.token.is_some()) {
            (true, false) => {
                info!(id = %held, "wallet authorization approved");
                self.token = Some(held.clone());
                Some(SessionEvent::TokenEmitted(held))
            }
            (false, true) => {
                info!(id = %held, "wallet authorization no longer reported, clearing token");
                self.token = None;
                Some(SessionEvent::TokenCleared)
            }
            _ => None,
        };

        Ok(PollOutcome::Applied { transition, event })
    }

    /// Releases the request and any emitted token.
    pub fn teardown(&mut self) -> Result<StateTransition, TransitionError> {
        let transition = self.transition(SessionAction::Teardown)?;
        if let Some(request) = self.request.take() {
            debug!(id = %request.id, "wallet authorization session released");
        }
        self.token = None;
        self.last_applied = None;
        Ok(transition)
    }

    fn transition(&mut self, action: SessionAction) -> Result<StateTransition, TransitionError> {
        let (to, transition) = session_transition(self.state, action)?;
        self.state = to;
        // Self-loops fire on every tick; only state changes are kept.
        if transition.from != transition.to {
            self.history.push(transition.clone());
        }
        Ok(transition)
    }
}
