//! Cold-vault move: request → approve (two admins) → execute.

use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColdMoveState {
    #[default]
    Idle,
    /// Amount entered, request not yet accepted.
    Request,
    Approve {
        move_id: String,
        approved_admin1: bool,
        approved_admin2: bool,
    },
    Execute { move_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColdMoveEvent {
    Start,
    Requested { move_id: String },
    Approved {
        approved_admin1: bool,
        approved_admin2: bool,
    },
    Executed,
    /// A step failed; the same step may be retried.
    Failed { message: String },
    Cancel,
}

impl ColdMoveState {
    pub fn name(&self) -> &'static str {
        match self {
            ColdMoveState::Idle => "idle",
            ColdMoveState::Request => "request",
            ColdMoveState::Approve { .. } => "approve",
            ColdMoveState::Execute { .. } => "execute",
        }
    }

    pub fn move_id(&self) -> Option<&str> {
        match self {
            ColdMoveState::Approve { move_id, .. } | ColdMoveState::Execute { move_id } => {
                Some(move_id)
            }
            _ => None,
        }
    }

    /// Approve moves on to Execute only once both admins have signed.
    pub fn apply(self, event: ColdMoveEvent) -> ColdMoveState {
        use ColdMoveEvent as E;
        use ColdMoveState as S;

        let from = self.name();
        let next = match (self, event) {
            (S::Idle, E::Start) => S::Request,
            (S::Request, E::Requested { move_id }) => S::Approve {
                move_id,
                approved_admin1: false,
                approved_admin2: false,
            },
            (
                S::Approve { move_id, .. },
                E::Approved {
                    approved_admin1,
                    approved_admin2,
                },
            ) => {
                if approved_admin1 && approved_admin2 {
                    S::Execute { move_id }
                } else {
                    S::Approve {
                        move_id,
                        approved_admin1,
                        approved_admin2,
                    }
                }
            }
            (S::Execute { .. }, E::Executed) => S::Idle,
            (_, E::Cancel) => S::Idle,
            (state, E::Failed { message }) => {
                warn!(state = state.name(), %message, "cold move step failed");
                return state;
            }
            (state, event) => {
                warn!(state = state.name(), ?event, "ignored cold move event");
                return state;
            }
        };

        info!(from, to = next.name(), "cold move transition");
        next
    }
}
