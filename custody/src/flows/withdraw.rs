//! Withdrawal flow: form → submit → approve → execute → result.
//!
//! The state machine is pure; the withdraw page drives it with one backend
//! call per processing step and feeds the outcome back in as an event.

use tracing::{info, warn};

/// Hashes collected along the way. Any of them may be missing if the
/// backend omitted it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_id: String,
    pub submit_hash: Option<String>,
    pub approve_hash: Option<String>,
    pub manager_hash: Option<String>,
    pub execute_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawState {
    /// Collecting input; carries the last failure, if any.
    Form { error: Option<String> },
    Submitting,
    Approving {
        tx_id: String,
        submit_hash: Option<String>,
    },
    Executing(WithdrawReceipt),
    /// Parked until a manager approves it; execute was not called.
    WaitingManager(WithdrawReceipt),
    Executed(WithdrawReceipt),
}

impl Default for WithdrawState {
    fn default() -> Self {
        WithdrawState::Form { error: None }
    }
}

impl WithdrawState {
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            WithdrawState::Submitting | WithdrawState::Approving { .. } | WithdrawState::Executing(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WithdrawState::WaitingManager(_) | WithdrawState::Executed(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            WithdrawState::Form { .. } => "form",
            WithdrawState::Submitting => "submitting",
            WithdrawState::Approving { .. } => "approving",
            WithdrawState::Executing(_) => "executing",
            WithdrawState::WaitingManager(_) => "waiting_manager",
            WithdrawState::Executed(_) => "executed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawEvent {
    /// Form passed validation.
    Submit,
    Submitted {
        tx_id: String,
        tx_hash: Option<String>,
    },
    Approved {
        requires_manager_approval: bool,
        tx_hash: Option<String>,
        manager_tx_hash: Option<String>,
    },
    Executed { tx_hash: Option<String> },
    Failed { message: String },
    /// "New withdrawal" from a result screen.
    Reset,
}

impl WithdrawState {
    /// Next state for `event`. Events that make no sense in the current state
    /// leave it unchanged.
    pub fn apply(self, event: WithdrawEvent) -> WithdrawState {
        use WithdrawEvent as E;
        use WithdrawState as S;

        let from = self.name();
        let next = match (self, event) {
            (S::Form { .. }, E::Submit) => S::Submitting,
            (S::Submitting, E::Submitted { tx_id, tx_hash }) => S::Approving {
                tx_id,
                submit_hash: tx_hash,
            },
            (
                S::Approving { tx_id, submit_hash },
                E::Approved {
                    requires_manager_approval,
                    tx_hash,
                    manager_tx_hash,
                },
            ) => {
                let receipt = WithdrawReceipt {
                    tx_id,
                    submit_hash,
                    approve_hash: tx_hash,
                    manager_hash: manager_tx_hash,
                    execute_hash: None,
                };
                if requires_manager_approval {
                    S::WaitingManager(receipt)
                } else {
                    S::Executing(receipt)
                }
            }
            (S::Executing(mut receipt), E::Executed { tx_hash }) => {
                receipt.execute_hash = tx_hash;
                S::Executed(receipt)
            }
            (state, E::Failed { message }) if state.is_processing() => S::Form {
                error: Some(message),
            },
            (state, E::Reset) if state.is_terminal() => S::default(),
            (state, event) => {
                warn!(state = state.name(), ?event, "ignored withdraw event");
                return state;
            }
        };

        info!(from, to = next.name(), "withdraw transition");
        next
    }
}
