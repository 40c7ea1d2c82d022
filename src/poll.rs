use crate::{
    board::BoardState,
    error::ClientError,
    gateway::{
        ChainReader,
        ContractGateway,
        GameRecord,
    },
    session::WalletProvider,
};
use std::{
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time,
};
use tracing::{
    debug,
    info,
    warn,
};

/// Best-known state of one game at one poll tick. Never proof that a prior
/// broadcast landed; confirmation latency is unbounded from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: u64,
    pub record: Option<GameRecord>,
    pub board: BoardState,
}

/// Opaque handle to one recurring refresh task, scoped to one game id.
/// Cancellation is checked before a tick fires and again before a fetched
/// result is committed, so a stale poll can never overwrite a newer game.
struct PollHandle {
    game_id: u64,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Drives the gateway's read-only queries on an interval and publishes
/// each successful snapshot over a watch channel. One schedule at a time:
/// starting a new game id replaces the previous schedule.
pub struct PollingScheduler {
    snapshots: watch::Sender<Option<GameSnapshot>>,
    active: Option<PollHandle>,
}

impl PollingScheduler {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            snapshots,
            active: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GameSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn polled_game(&self) -> Option<u64> {
        self.active.as_ref().map(|handle| handle.game_id)
    }

    /// Begins immediately with one fetch, then repeats every `interval`.
    /// A failing tick is logged and the schedule carries on; there is no
    /// backoff and no retry-now.
    pub fn start<W, R>(
        &mut self,
        gateway: Arc<ContractGateway<W, R>>,
        game_id: u64,
        interval: Duration,
    ) where
        W: WalletProvider + 'static,
        R: ChainReader + 'static,
    {
        self.stop();
        info!(%game_id, interval_ms = interval.as_millis() as u64, "starting poll schedule");
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.snapshots.clone();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match fetch_snapshot(&gateway, game_id).await {
                    Ok(snapshot) => {
                        // a result that raced a cancel must not land
                        if flag.load(Ordering::SeqCst) {
                            break;
                        }
                        debug!(%game_id, "poll tick committed");
                        tx.send_replace(Some(snapshot));
                    }
                    Err(err) => {
                        warn!(%game_id, error = %err, "poll tick failed; keeping last snapshot");
                    }
                }
            }
        });
        self.active = Some(PollHandle {
            game_id,
            cancelled,
            task,
        });
    }

    /// Idempotent; a schedule that is not running is a no-op.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            info!(game_id = %handle.game_id, "stopping poll schedule");
            handle.cancel();
        }
    }
}

impl Default for PollingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn fetch_snapshot<W, R>(
    gateway: &ContractGateway<W, R>,
    game_id: u64,
) -> Result<GameSnapshot, ClientError>
where
    W: WalletProvider,
    R: ChainReader,
{
    let record = gateway.get_game(game_id).await?;
    let board = gateway.get_board(game_id).await?;
    Ok(GameSnapshot {
        game_id,
        record,
        board,
    })
}
