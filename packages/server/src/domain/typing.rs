//! Typing-indicator tracker.
//!
//! Per user: Idle → Typing on a start signal, back to Idle on an explicit
//! stop or when the quiet period elapses without a renewing start. Only the
//! transitions are announced; a renewal just pushes the deadline back.
//!
//! Every armed timer carries a generation. Cancelling aborts the timer task
//! and forgets the entry, and an expiry whose generation is no longer current
//! is ignored, so a late timer can never stop a renewed indicator.

use std::{collections::HashMap, time::Duration};

use tokio::task::AbortHandle;

use super::{ConnectionId, DisplayName, PresenceRegistry, Role, TypingSignal, UserId};

/// Quiet period after which a typing indicator stops on its own
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug)]
pub struct TypingState {
    pub user_name: DisplayName,
    pub role: Role,
    pub target_id: Option<UserId>,
    /// Connection the start signal came from
    pub connection: ConnectionId,
    generation: u64,
    timer: Option<AbortHandle>,
}

impl TypingState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Result of a start signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingStart {
    /// Idle → Typing; the audience must hear "started"
    Started { generation: u64 },
    /// Already typing to the same audience; deadline pushed back
    Renewed { generation: u64 },
    /// Already typing, but the role or target changed. The previous audience
    /// must hear "stopped" and the new one "started".
    Retargeted {
        generation: u64,
        previous_role: Role,
        previous_target: Option<UserId>,
        previous_connection: ConnectionId,
    },
}

impl TypingStart {
    pub fn generation(&self) -> u64 {
        match self {
            TypingStart::Started { generation }
            | TypingStart::Renewed { generation }
            | TypingStart::Retargeted { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Default)]
pub struct TypingTracker {
    states: HashMap<UserId, TypingState>,
    next_generation: u64,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start signal. Any pending timer for the user is cancelled
    /// before the new generation is handed out.
    pub fn start(&mut self, signal: TypingSignal, connection: ConnectionId) -> TypingStart {
        self.next_generation += 1;
        let generation = self.next_generation;

        let previous = self.states.remove(&signal.user_id).map(|mut state| {
            state.cancel_timer();
            state
        });

        let outcome = match previous {
            None => TypingStart::Started { generation },
            Some(previous)
                if previous.role == signal.role && previous.target_id == signal.target_id =>
            {
                TypingStart::Renewed { generation }
            }
            Some(previous) => TypingStart::Retargeted {
                generation,
                previous_role: previous.role,
                previous_target: previous.target_id,
                previous_connection: previous.connection,
            },
        };

        self.states.insert(
            signal.user_id,
            TypingState {
                user_name: signal.user_name,
                role: signal.role,
                target_id: signal.target_id,
                connection,
                generation,
                timer: None,
            },
        );

        outcome
    }

    /// Attach the expiry timer for `generation`.
    ///
    /// Returns `false` (and aborts `timer`) when the generation is no longer
    /// current, e.g. the user stopped or renewed in the meantime.
    pub fn arm(&mut self, user_id: &UserId, generation: u64, timer: AbortHandle) -> bool {
        match self.states.get_mut(user_id) {
            Some(state) if state.generation == generation => {
                state.cancel_timer();
                state.timer = Some(timer);
                true
            }
            _ => {
                timer.abort();
                false
            }
        }
    }

    /// Explicit stop. `None` when the user was not typing.
    pub fn stop(&mut self, user_id: &UserId) -> Option<TypingState> {
        let mut state = self.states.remove(user_id)?;
        state.cancel_timer();
        Some(state)
    }

    /// Timer callback. Only the current generation may end the indicator.
    ///
    /// The timer is not aborted here: the caller *is* the timer task.
    pub fn expire(&mut self, user_id: &UserId, generation: u64) -> Option<TypingState> {
        if self.states.get(user_id)?.generation != generation {
            return None;
        }
        let mut state = self.states.remove(user_id)?;
        state.timer = None;
        Some(state)
    }

    /// Cancel silently (disconnect cleanup). Idempotent.
    pub fn cancel(&mut self, user_id: &UserId) -> bool {
        self.stop(user_id).is_some()
    }

    pub fn is_typing(&self, user_id: &UserId) -> bool {
        self.states.contains_key(user_id)
    }

    pub fn typing_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.states.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Connections that should hear about `user_id` typing.
    ///
    /// Customers are announced to every agent except the typist's own
    /// connection; agents only to the customer they address.
    pub fn audience(
        registry: &PresenceRegistry,
        role: Role,
        target_id: Option<&UserId>,
        typist_connection: &ConnectionId,
    ) -> Vec<ConnectionId> {
        match role {
            Role::Customer => registry
                .agent_records()
                .filter(|record| &record.connection != typist_connection)
                .map(|record| record.connection.clone())
                .collect(),
            Role::Agent => target_id
                .and_then(|target| registry.resolve(target))
                .map(|record| vec![record.connection.clone()])
                .unwrap_or_default(),
        }
    }
}
