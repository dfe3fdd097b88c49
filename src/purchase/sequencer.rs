use alloy::primitives::Address;
use tokio::sync::{watch, Mutex};
use tracing::instrument;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::state::{transition, PurchaseEvent, PurchaseState};
use super::PurchaseIntent;
use crate::amount::Amount;
use crate::chain::{chain_name, ChainReader, ChainWriter};
use crate::constant::GENERIC_FAILURE;
use crate::error::{Error, Result};
use crate::sale::{AllowanceState, SaleAddresses};
use crate::wallet::WalletSession;

/// Runs approve-then-buy for one attempt at a time.
pub struct PurchaseSequencer<C: ?Sized> {
    chain: Arc<C>,
    addresses: SaleAddresses,
    expected_chain_id: u64,
    write_timeout: Duration,
    in_flight: Mutex<()>,
    status: watch::Sender<PurchaseState>,
}

impl<C> PurchaseSequencer<C>
where
    C: ChainReader + ChainWriter + ?Sized,
{
    pub fn new(
        chain: Arc<C>,
        addresses: SaleAddresses,
        expected_chain_id: u64,
        write_timeout: Duration,
    ) -> Self {
        let (status, _) = watch::channel(PurchaseState::Idle);
        Self {
            chain,
            addresses,
            expected_chain_id,
            write_timeout,
            in_flight: Mutex::new(()),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PurchaseState> {
        self.status.subscribe()
    }

    pub fn status(&self) -> PurchaseState {
        self.status.borrow().clone()
    }

    /// Runs one attempt to a terminal state. A call made while another attempt is running is
    /// turned away without touching the running attempt's status.
    #[instrument(name = "Purchase::Run", skip_all, fields(amount = %intent.quote_amount))]
    pub async fn run(&self, session: &WalletSession, intent: PurchaseIntent) -> PurchaseState {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("Purchase rejected: another attempt is in flight");
            return PurchaseState::RejectedLocal(Error::AttemptInFlight);
        };

        let mut state = self.status();
        if let Err(e) = self.advance(&mut state, PurchaseEvent::BuyRequested) {
            self.fail(&mut state, e);
            return state;
        }

        let owner = match self.validate(session, &intent) {
            Ok(owner) => owner,
            Err(e) => {
                tracing::info!("Purchase rejected locally: {}", e);
                if let Err(e) = self.advance(&mut state, PurchaseEvent::PreconditionFailed(e)) {
                    self.fail(&mut state, e);
                }
                return state;
            }
        };

        if let Err(e) = self.sequence(&mut state, owner, &intent.quote_amount).await {
            self.fail(&mut state, e);
        }

        state
    }

    fn validate(&self, session: &WalletSession, intent: &PurchaseIntent) -> Result<Address> {
        let owner = session.address.ok_or(Error::NotConnected)?;
        if session.chain_id != Some(self.expected_chain_id) {
            return Err(Error::WrongNetwork {
                expected: chain_name(self.expected_chain_id),
                actual: session.chain_id,
            });
        }
        if intent.quote_amount.is_zero() {
            return Err(Error::EmptyAmount);
        }
        Ok(owner)
    }

    async fn sequence(
        &self,
        state: &mut PurchaseState,
        owner: Address,
        spend: &Amount,
    ) -> Result<()> {
        let SaleAddresses {
            quote_token, sale, ..
        } = self.addresses;

        // decided from a fresh read, never from what the dashboard showed earlier
        let allowance = self
            .bounded("allowance", self.read_allowance(owner, spend))
            .await?;
        if allowance.covers(spend) {
            tracing::info!(
                "Allowance {} covers {}, skipping approve",
                allowance.amount,
                spend
            );
            self.advance(state, PurchaseEvent::AllowanceSufficient)?;
        } else {
            self.advance(state, PurchaseEvent::AllowanceInsufficient)?;

            tracing::info!("Approving {} for sale contract {}", spend, sale);
            let tx = self
                .bounded("approve", self.chain.approve(quote_token, sale, spend.base()))
                .await?;
            self.advance(state, PurchaseEvent::ApprovalSubmitted(tx))?;

            self.bounded(
                "approval confirmation",
                self.chain.wait_for_confirmation(&tx),
            )
            .await?;
            self.advance(state, PurchaseEvent::ApprovalConfirmed)?;

            let allowance = self
                .bounded("allowance", self.read_allowance(owner, spend))
                .await?;
            if !allowance.covers(spend) {
                return Err(Error::WriteRejected(format!(
                    "Allowance is {} after approval, {} required",
                    allowance.amount, spend
                )));
            }
            self.advance(state, PurchaseEvent::PurchaseStarted)?;
        }

        let tx = self
            .bounded("buyWithExactB", self.chain.buy_with_exact_b(sale, spend.base()))
            .await?;
        self.advance(state, PurchaseEvent::PurchaseSubmitted(tx))?;
        tracing::info!("Purchase submitted: {}", tx);

        Ok(())
    }

    async fn read_allowance(&self, owner: Address, spend: &Amount) -> Result<AllowanceState> {
        AllowanceState::read(
            self.chain.as_ref(),
            self.addresses.quote_token,
            owner,
            self.addresses.sale,
            spend.decimals(),
        )
        .await
    }

    async fn bounded<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.write_timeout, call)
            .await
            .map_err(|_| Error::Timeout(what, self.write_timeout.as_secs()))?
    }

    fn advance(&self, state: &mut PurchaseState, event: PurchaseEvent) -> Result<()> {
        let next = transition(state, event)?;
        tracing::debug!("Purchase state: {:?} -> {:?}", state, next);
        *state = next;
        self.status.send_replace(state.clone());
        Ok(())
    }

    fn fail(&self, state: &mut PurchaseState, error: Error) {
        let error = match error {
            Error::WriteRejected(message) if message.trim().is_empty() => {
                Error::WriteRejected(GENERIC_FAILURE.to_string())
            }
            error => error,
        };
        tracing::error!("Purchase failed: {}", error);

        if let Err(invalid) = self.advance(state, PurchaseEvent::Failed(error)) {
            tracing::error!("{}", invalid);
            *state = PurchaseState::Failed(invalid);
            self.status.send_replace(state.clone());
        }
    }
}
