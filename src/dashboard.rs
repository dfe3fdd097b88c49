use alloy::primitives::Address;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use std::sync::Arc;
use std::time::Duration;

use crate::amount::Amount;
use crate::chain::{ChainReader, ChainWriter};
use crate::constant::*;
use crate::error::Error;
use crate::orchestrator::PurchaseOrchestrator;
use crate::purchase::state::PurchaseState;
use crate::sale::reconcile::Reading;
use crate::sale::SaleSnapshot;
use crate::view::{connect_bar, footer, sale_panel, status_text, DashboardView};
use crate::wallet::WalletSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a keyword replaces the quote input. Malformed text is kept as typed
    /// and simply estimates to zero.
    Amount(String),
    Buy,
    Refresh,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let command = match line.to_ascii_lowercase().as_str() {
            "" => return None,
            "buy" => Command::Buy,
            "refresh" | "r" => Command::Refresh,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Amount(line.to_string()),
        };
        Some(command)
    }
}

const HELP: &str = "Type an amount of Token B to estimate, `buy` to purchase it, \
                    `refresh` to re-read the sale, `quit` to leave.";

pub struct Dashboard<C: ?Sized> {
    orchestrator: Arc<PurchaseOrchestrator<C>>,
    address: Option<Address>,
    expected_chain_id: u64,
    explorer_url: String,
    refresh_interval: Duration,
    json_output: bool,

    session: WalletSession,
    native_balance: Reading<Amount>,
    snapshot: Option<SaleSnapshot>,
    input: String,
}

impl<C> Dashboard<C>
where
    C: ChainReader + ChainWriter + ?Sized + 'static,
{
    fn new(
        orchestrator: Arc<PurchaseOrchestrator<C>>,
        address: Option<Address>,
        expected_chain_id: u64,
        explorer_url: String,
        refresh_interval: Duration,
        json_output: bool,
    ) -> Self {
        Self {
            orchestrator,
            address,
            expected_chain_id,
            explorer_url,
            refresh_interval,
            json_output,
            session: WalletSession {
                address,
                chain_id: None,
            },
            native_balance: Reading::Unavailable,
            snapshot: None,
            input: "0".to_string(),
        }
    }

    pub async fn refresh(&mut self) {
        let chain = self.orchestrator.chain();
        self.session = WalletSession::read(chain, self.address).await;
        let (native_balance, snapshot) = tokio::join!(
            self.session.native_balance(chain),
            self.orchestrator.refresh(&self.session)
        );
        self.native_balance = native_balance;
        self.snapshot = Some(snapshot);
    }

    /// `None` until the first refresh has completed.
    pub fn view(&self) -> Option<DashboardView> {
        let snapshot = self.snapshot.as_ref()?;
        let estimate = self.orchestrator.estimate(&self.input, snapshot);
        let quote_symbol = snapshot
            .quote_token
            .symbol
            .ready()
            .cloned()
            .unwrap_or_else(|| "Token B".to_string());

        Some(DashboardView {
            connect_bar: connect_bar(&self.session, &self.native_balance),
            sale_token: snapshot.sale_token.view(),
            quote_token: snapshot.quote_token.view(),
            sale: sale_panel(snapshot, &self.input, &estimate),
            status: status_text(&self.orchestrator.status(), &self.explorer_url),
            footer: footer(self.expected_chain_id, &quote_symbol),
        })
    }

    fn render(&self) -> Result<()> {
        let Some(view) = self.view() else {
            return Ok(());
        };
        if self.json_output {
            println!("{}", view.to_json()?);
        } else {
            println!("{view}\n");
        }
        Ok(())
    }

    /// Starts a purchase in the background so the loop keeps rendering status updates.
    pub fn start_buy(&self) -> Option<JoinHandle<PurchaseState>> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            println!("Sale not loaded yet, try again after refresh.");
            return None;
        };
        let Some(intent) = self.orchestrator.estimate(&self.input, snapshot).intent else {
            println!("Token B decimals are {PLACEHOLDER}, try again after refresh.");
            return None;
        };

        let orchestrator = self.orchestrator.clone();
        let session = self.session;
        Some(tokio::spawn(async move {
            let state = orchestrator.buy(&session, intent).await;
            if state == PurchaseState::RejectedLocal(Error::AttemptInFlight) {
                println!("{}", Error::AttemptInFlight);
            }
            state
        }))
    }

    /// Returns `false` once the user asked to leave.
    pub async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Amount(input) => {
                self.input = input;
                self.render()?;
            }
            Command::Buy => {
                self.start_buy();
            }
            Command::Refresh => {
                self.refresh().await;
                self.render()?;
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    pub async fn run_loop(mut self) -> Result<()> {
        let mut refresh_round = 1;
        let mut refresh_timer = tokio::time::interval(self.refresh_interval);
        let mut status = self.orchestrator.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{HELP}");

        loop {
            tokio::select! {
                _ = refresh_timer.tick() => {
                    self.refresh().await;
                    tracing::debug!("Refresh round {} completed", refresh_round);
                    refresh_round += 1;

                    if let Err(e) = self.render() {
                        tracing::error!("Failed to render dashboard: {}", e);
                    }
                }
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = status.borrow_and_update().clone();
                    tracing::info!("Purchase status: {:?}", state);

                    // balances and remaining cap moved
                    if matches!(state, PurchaseState::Submitted(_)) {
                        self.refresh().await;
                    }
                    if let Err(e) = self.render() {
                        tracing::error!("Failed to render dashboard: {}", e);
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed, leaving dashboard");
                        break;
                    };
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    if !self.handle(command).await? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

pub struct DashboardBuilder<C: ?Sized> {
    orchestrator: Arc<PurchaseOrchestrator<C>>,
    address: Option<Address>,
    expected_chain_id: u64,
    explorer_url: String,
    refresh_interval: Duration,
    json_output: bool,
}

impl<C> DashboardBuilder<C>
where
    C: ChainReader + ChainWriter + ?Sized + 'static,
{
    pub fn new(orchestrator: Arc<PurchaseOrchestrator<C>>) -> Self {
        Self {
            orchestrator,
            address: None,
            expected_chain_id: SEPOLIA_CHAIN_ID,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            refresh_interval: Duration::from_secs(15),
            json_output: false,
        }
    }

    pub fn with_address(mut self, address: Option<Address>) -> Self {
        self.address = address;
        self
    }

    pub fn with_expected_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = chain_id;
        self
    }

    pub fn with_explorer_url(mut self, explorer_url: impl Into<String>) -> Self {
        self.explorer_url = explorer_url.into();
        self
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    pub fn build(self) -> Dashboard<C> {
        Dashboard::new(
            self.orchestrator,
            self.address,
            self.expected_chain_id,
            self.explorer_url,
            self.refresh_interval,
            self.json_output,
        )
    }
}
