use serde::Serialize;

use std::fmt;

use crate::amount::Amount;
use crate::chain::chain_name;
use crate::constant::PLACEHOLDER;
use crate::orchestrator::Estimate;
use crate::purchase::state::PurchaseState;
use crate::sale::reconcile::{CapUsage, Reading};
use crate::sale::SaleSnapshot;
use crate::token::structs::TokenPanelView;
use crate::wallet::WalletSession;

pub const TITLE: &str = "BePAY IDO Dashboard";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectBarView {
    pub network: String,
    pub address: String,
    pub native_balance: String,
}

pub fn connect_bar(session: &WalletSession, native_balance: &Reading<Amount>) -> ConnectBarView {
    ConnectBarView {
        network: session.network_name(),
        address: session
            .address
            .map(|address| address.to_string())
            .unwrap_or_else(|| "not connected".to_string()),
        native_balance: native_balance.display(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalePanelView {
    pub sale_symbol: String,
    pub quote_symbol: String,
    /// Raw `priceBPerA`, in quote base units.
    pub price_b_per_a: String,
    pub available_token_a: String,
    pub sale_open: String,
    pub per_wallet_cap_a: String,
    pub remaining_for_wallet: String,
    pub cap_usage: CapUsage,
    pub cap_usage_text: String,
    pub input: String,
    pub estimate: String,
}

pub fn sale_panel(snapshot: &SaleSnapshot, input: &str, estimate: &Estimate) -> SalePanelView {
    let state = snapshot.state();
    let available_token_a = state
        .available_a
        .value()
        .map(|amount| amount.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    SalePanelView {
        sale_symbol: snapshot.sale_token.symbol.display(),
        quote_symbol: snapshot.quote_token.symbol.display(),
        price_b_per_a: snapshot.price_b_per_a.display(),
        available_token_a,
        sale_open: state.is_open.display(),
        per_wallet_cap_a: state.per_wallet_cap_a.display(),
        remaining_for_wallet: state.remaining_for_wallet.display(),
        cap_usage_text: state.cap_usage.display(),
        cap_usage: state.cap_usage,
        input: input.to_string(),
        estimate: estimate.display(),
    }
}

/// `None` while nothing has been attempted yet.
pub fn status_text(state: &PurchaseState, explorer_url: &str) -> Option<String> {
    let text = match state {
        PurchaseState::Idle => return None,
        PurchaseState::Validating
        | PurchaseState::NeedsApproval
        | PurchaseState::Approved
        | PurchaseState::Buying => "Preparing transaction…".to_string(),
        PurchaseState::Approving => "Waiting for approval to confirm…".to_string(),
        PurchaseState::Submitted(tx) => format!(
            "Tx submitted: View on Etherscan {}",
            tx.explorer_url(explorer_url)
        ),
        PurchaseState::RejectedLocal(e) | PurchaseState::Failed(e) => e.to_string(),
    };
    Some(text)
}

pub fn footer(expected_chain_id: u64, quote_symbol: &str) -> String {
    format!(
        "Ensure wallet is on {} ({}). Uses approve → buyWithExactB in {}.",
        chain_name(expected_chain_id),
        expected_chain_id,
        quote_symbol
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub connect_bar: ConnectBarView,
    pub sale_token: TokenPanelView,
    pub quote_token: TokenPanelView,
    pub sale: SalePanelView,
    pub status: Option<String>,
    pub footer: String,
}

impl DashboardView {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, panel: &TokenPanelView) -> fmt::Result {
    writeln!(f, "── {} ──", panel.title)?;
    writeln!(
        f,
        "Name: {}  Symbol: {}  Decimals: {}  Your Balance: {}",
        panel.name, panel.symbol, panel.decimals, panel.balance
    )
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar = &self.connect_bar;
        let sale = &self.sale;

        writeln!(f, "{}", TITLE)?;
        writeln!(
            f,
            "Network: {}  |  {}  |  Balance: {} ETH",
            bar.network, bar.address, bar.native_balance
        )?;
        write_token(f, &self.sale_token)?;
        write_token(f, &self.quote_token)?;

        writeln!(f, "── IDO ──")?;
        writeln!(f, "Price B per A: {}", sale.price_b_per_a)?;
        writeln!(
            f,
            "Available Token A ({}): {}",
            sale.sale_symbol, sale.available_token_a
        )?;
        writeln!(f, "Sale Open?: {}", sale.sale_open)?;
        writeln!(
            f,
            "Per-wallet cap: {}  Remaining: {}  Used: {}",
            sale.per_wallet_cap_a, sale.remaining_for_wallet, sale.cap_usage_text
        )?;
        writeln!(f, "Amount ({}): {}", sale.quote_symbol, sale.input)?;
        writeln!(f, "Amount ({}): {}", sale.sale_symbol, sale.estimate)?;
        if let Some(status) = &self.status {
            writeln!(f, "Status: {}", status)?;
        }
        write!(f, "{}", self.footer)
    }
}
