use crate::chain::TxRef;
use crate::error::{Error, Result};

/// Where one purchase attempt stands.
///
/// ```text
/// Idle -> Validating -> [NeedsApproval -> Approving -> Approved] -> Buying -> Submitted
///                  \-> RejectedLocal            \-> Failed        \-> Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PurchaseState {
    #[default]
    Idle,
    Validating,
    NeedsApproval,
    Approving,
    Approved,
    Buying,
    Submitted(TxRef),
    RejectedLocal(Error),
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseEvent {
    BuyRequested,
    PreconditionFailed(Error),
    AllowanceSufficient,
    AllowanceInsufficient,
    ApprovalSubmitted(TxRef),
    ApprovalConfirmed,
    PurchaseStarted,
    PurchaseSubmitted(TxRef),
    Failed(Error),
}

impl PurchaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseState::Submitted(_) | PurchaseState::RejectedLocal(_) | PurchaseState::Failed(_)
        )
    }

    /// Idle and the terminal states accept a new attempt.
    pub fn can_start(&self) -> bool {
        matches!(self, PurchaseState::Idle) || self.is_terminal()
    }
}

pub fn transition(state: &PurchaseState, event: PurchaseEvent) -> Result<PurchaseState> {
    use PurchaseEvent as E;
    use PurchaseState as S;

    let next = match (state, event) {
        (s, E::BuyRequested) if s.can_start() => S::Validating,

        (S::Validating, E::PreconditionFailed(e)) => S::RejectedLocal(e),
        (S::Validating, E::AllowanceSufficient) => S::Buying,
        (S::Validating, E::AllowanceInsufficient) => S::NeedsApproval,

        (S::NeedsApproval, E::ApprovalSubmitted(_)) => S::Approving,
        (S::Approving, E::ApprovalConfirmed) => S::Approved,
        (S::Approved, E::PurchaseStarted) => S::Buying,

        (S::Buying, E::PurchaseSubmitted(tx)) => S::Submitted(tx),

        (
            S::Validating | S::NeedsApproval | S::Approving | S::Approved | S::Buying,
            E::Failed(e),
        ) => S::Failed(e),

        (state, event) => {
            return Err(Error::InvalidTransition(format!(
                "{event:?} while {state:?}"
            )))
        }
    };

    Ok(next)
}
