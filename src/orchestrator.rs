use tokio::sync::watch;

use std::sync::Arc;
use std::time::Duration;

use crate::amount::{estimate_sale_token_amount, format_amount, Amount};
use crate::chain::{ChainReader, ChainWriter};
use crate::purchase::sequencer::PurchaseSequencer;
use crate::purchase::state::PurchaseState;
use crate::purchase::PurchaseIntent;
use crate::sale::reconcile::Reading;
use crate::sale::{SaleAddresses, SaleSnapshot};
use crate::wallet::WalletSession;

#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// `None` until the quote token's decimals are known; nothing can be bought before that.
    pub intent: Option<PurchaseIntent>,
    pub sale_amount: Reading<Amount>,
}

impl Estimate {
    /// The estimate field always renders; anything unknown shows as zero.
    pub fn display(&self) -> String {
        self.sale_amount
            .ready()
            .map(format_amount)
            .unwrap_or_else(|| "0".to_string())
    }
}

/// Pure function of the last snapshot: re-run on every keystroke without touching the chain.
pub fn estimate(input: &str, snapshot: &SaleSnapshot) -> Estimate {
    let Some(quote_decimals) = snapshot.quote_decimals().into_option() else {
        return Estimate {
            intent: None,
            sale_amount: Reading::Unavailable,
        };
    };

    let intent = PurchaseIntent::resolve(input, quote_decimals);
    let sale_amount = snapshot
        .price()
        .zip(snapshot.sale_decimals())
        .map(|(price, sale_decimals)| {
            estimate_sale_token_amount(&intent.quote_amount, &price, sale_decimals)
        });

    Estimate {
        intent: Some(intent),
        sale_amount,
    }
}

pub struct PurchaseOrchestrator<C: ?Sized> {
    chain: Arc<C>,
    addresses: SaleAddresses,
    sequencer: PurchaseSequencer<C>,
}

impl<C> PurchaseOrchestrator<C>
where
    C: ChainReader + ChainWriter + ?Sized,
{
    pub fn new(
        chain: Arc<C>,
        addresses: SaleAddresses,
        expected_chain_id: u64,
        write_timeout: Duration,
    ) -> Self {
        let sequencer =
            PurchaseSequencer::new(chain.clone(), addresses, expected_chain_id, write_timeout);
        Self {
            chain,
            addresses,
            sequencer,
        }
    }

    pub fn chain(&self) -> &C {
        self.chain.as_ref()
    }

    pub async fn refresh(&self, session: &WalletSession) -> SaleSnapshot {
        SaleSnapshot::read(self.chain.as_ref(), &self.addresses, session.address).await
    }

    pub fn estimate(&self, input: &str, snapshot: &SaleSnapshot) -> Estimate {
        estimate(input, snapshot)
    }

    pub async fn buy(&self, session: &WalletSession, intent: PurchaseIntent) -> PurchaseState {
        self.sequencer.run(session, intent).await
    }

    pub fn status(&self) -> PurchaseState {
        self.sequencer.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<PurchaseState> {
        self.sequencer.subscribe()
    }
}
