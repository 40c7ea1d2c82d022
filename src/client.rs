use crate::{
    gateway::{
        ContractGateway,
        ContractIdentity,
    },
    node_client::NodeClient,
    poll::{
        GameSnapshot,
        PollingScheduler,
    },
    session::{
        NetworkId,
        SessionManager,
        WalletSession,
        WatchOnlyWallet,
    },
    view::derive_view,
};
use color_eyre::eyre::Result;
use std::{
    sync::Arc,
    time::Duration,
};
use tracing::info;

pub const DEFAULT_MAINNET_API_URL: &str = "https://api.mainnet.hiro.so";
pub const DEFAULT_TESTNET_API_URL: &str = "https://api.testnet.hiro.so";
pub const DEFAULT_DEVNET_API_URL: &str = "http://localhost:3999";

/// Deployment the original dapp points at; overridable with --contract.
pub const DEFAULT_CONTRACT: &str =
    "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.checkers";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

#[derive(Clone, Debug)]
pub enum NetworkTarget {
    Mainnet { url: String },
    Testnet { url: String },
    Devnet { url: String },
}

impl NetworkTarget {
    pub fn id(&self) -> NetworkId {
        match self {
            NetworkTarget::Mainnet { .. } => NetworkId::Mainnet,
            NetworkTarget::Testnet { .. } => NetworkId::Testnet,
            NetworkTarget::Devnet { .. } => NetworkId::Devnet,
        }
    }

    pub fn api_url(&self) -> &str {
        match self {
            NetworkTarget::Mainnet { url }
            | NetworkTarget::Testnet { url }
            | NetworkTarget::Devnet { url } => url,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub contract: ContractIdentity,
    pub game_id: u64,
    pub poll_interval: Duration,
}

/// Headless watcher: polls one game and reports the derived view on every
/// committed snapshot until ctrl-c. Runs watch-only; mutating calls need a
/// host that supplies a signing wallet provider.
pub async fn run_app(config: AppConfig) -> Result<()> {
    let provider = Arc::new(WatchOnlyWallet);
    let sessions = SessionManager::new(Arc::clone(&provider), config.network.id());
    let reader = NodeClient::new(config.network.api_url())?;
    let gateway = Arc::new(ContractGateway::new(
        config.contract.clone(),
        provider,
        reader,
    ));
    info!(
        contract = %config.contract,
        network = %config.network.id(),
        game_id = config.game_id,
        "watching game"
    );

    let mut scheduler = PollingScheduler::new();
    let mut snapshots = scheduler.subscribe();
    scheduler.start(gateway, config.game_id, config.poll_interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    report_snapshot(&snapshot, &sessions.current_session());
                }
            }
        }
    }
    scheduler.stop();
    Ok(())
}

fn report_snapshot(snapshot: &GameSnapshot, session: &WalletSession) {
    match &snapshot.record {
        Some(record) => {
            let view = derive_view(record, session);
            info!(
                game_id = snapshot.game_id,
                role = %view.role,
                my_turn = view.is_my_turn,
                status = %view.status,
                player1 = %record.player1,
                player2 = ?record.player2,
                "game state"
            );
            println!("game {} [{}]", snapshot.game_id, view.status);
            for row in snapshot.board.cells().chunks(8) {
                let line: Vec<String> =
                    row.iter().map(|code| code.to_string()).collect();
                println!("  {}", line.join(" "));
            }
        }
        None => {
            info!(game_id = snapshot.game_id, "game not found on ledger yet");
        }
    }
}
