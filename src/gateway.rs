use crate::{
    board::{
        BoardState,
        decode_board,
    },
    clarity::ClarityValue,
    error::ClientError,
    principal::Principal,
    session::{
        WalletError,
        WalletProvider,
    },
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{
        Arc,
        Mutex,
    },
};
use tracing::{
    info,
    warn,
};

/// One fixed contract per deployment: deployer address plus contract name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractIdentity {
    pub address: Principal,
    pub name: String,
}

impl fmt::Display for ContractIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

impl FromStr for ContractIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, name) = s
            .split_once('.')
            .ok_or_else(|| format!("'{s}' is not of the form ADDRESS.name"))?;
        if name.is_empty() {
            return Err(format!("'{s}' has an empty contract name"));
        }
        let address = Principal::from_str(address)
            .map_err(|e| format!("invalid contract address '{address}': {e}"))?;
        Ok(Self {
            address,
            name: name.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    CreateGame,
    JoinGame,
    Move,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::CreateGame => "create-game",
            OpKind::JoinGame => "join-game",
            OpKind::Move => "move",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpStatus {
    Submitting,
    /// The wallet prompt is open. This is the stage of unbounded duration,
    /// and the one callers actually observe.
    AwaitingConfirmation,
}

/// Transient record of one in-flight mutating call. The entry lives exactly
/// as long as the call itself; outcomes travel in the call's `Result`, and
/// ledger finality is never observed synchronously at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingOperation {
    pub kind: OpKind,
    pub status: OpStatus,
}

/// Typed arguments handed to the wallet for confirmation and broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCallRequest {
    pub contract: ContractIdentity,
    pub function: String,
    pub args: Vec<ClarityValue>,
}

/// Acknowledgment that a transaction reached the network layer. Says
/// nothing about inclusion or acceptance by the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub txid: String,
}

/// Read-only access to current ledger state. No signature, no mutation.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn call_read_only(
        &self,
        contract: &ContractIdentity,
        function: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ClientError>;
}

/// Read-only snapshot of one game as the ledger reports it. Replaced
/// wholesale on every successful query, never mutated locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub player1: Principal,
    pub player2: Option<Principal>,
    pub current_turn: Principal,
    pub is_active: bool,
}

impl GameRecord {
    fn from_tuple(
        entries: &std::collections::BTreeMap<String, ClarityValue>,
    ) -> Result<Self, ClientError> {
        let field = |name: &str| {
            entries.get(name).ok_or_else(|| {
                ClientError::DecodeAnomaly(format!("game record missing field '{name}'"))
            })
        };
        let player1 = field("player1")?.expect_principal()?;
        let player2 = match field("player2")?.clone().into_optional() {
            None => None,
            Some(value) => Some(value.expect_principal()?),
        };
        let current_turn = field("current-turn")?.expect_principal()?;
        let is_active = field("is-active")?.expect_bool()?;

        let record = Self {
            player1,
            player2,
            current_turn,
            is_active,
        };
        // the ledger owns turn alternation; a violation is worth noting but
        // not worth discarding an otherwise well-formed snapshot
        if !record.turn_is_consistent() {
            warn!(current_turn = %record.current_turn, "game record current-turn matches neither player");
        }
        Ok(record)
    }

    fn turn_is_consistent(&self) -> bool {
        self.current_turn == self.player1 || Some(self.current_turn) == self.player2
    }
}

/// Issues calls against the one fixed contract identity. Mutating calls go
/// through the wallet and return broadcast acknowledgments; read-only calls
/// go through the chain reader. Legality of moves is entirely the
/// contract's business and surfaces only as a later rejection.
pub struct ContractGateway<W, R> {
    contract: ContractIdentity,
    wallet: Arc<W>,
    reader: R,
    in_flight: Mutex<HashMap<OpKind, PendingOperation>>,
}

impl<W, R> ContractGateway<W, R>
where
    W: WalletProvider,
    R: ChainReader,
{
    pub fn new(contract: ContractIdentity, wallet: Arc<W>, reader: R) -> Self {
        Self {
            contract,
            wallet,
            reader,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn contract(&self) -> &ContractIdentity {
        &self.contract
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Advisory only: a UX affordance, not a ledger-side mutex.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.lock().expect("in-flight table poisoned").is_empty()
    }

    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        let table = self.in_flight.lock().expect("in-flight table poisoned");
        table.values().copied().collect()
    }

    pub async fn create_game(&self) -> Result<BroadcastReceipt, ClientError> {
        self.submit(OpKind::CreateGame, Vec::new()).await
    }

    pub async fn join_game(&self, game_id: u64) -> Result<BroadcastReceipt, ClientError> {
        self.submit(OpKind::JoinGame, vec![ClarityValue::Uint(game_id as u128)])
            .await
    }

    pub async fn submit_move(
        &self,
        game_id: u64,
        from: u32,
        to: u32,
    ) -> Result<BroadcastReceipt, ClientError> {
        self.submit(
            OpKind::Move,
            vec![
                ClarityValue::Uint(game_id as u128),
                ClarityValue::Uint(from as u128),
                ClarityValue::Uint(to as u128),
            ],
        )
        .await
    }

    async fn submit(
        &self,
        kind: OpKind,
        args: Vec<ClarityValue>,
    ) -> Result<BroadcastReceipt, ClientError> {
        let guard = InFlightGuard::begin(&self.in_flight, kind)?;
        let request = ContractCallRequest {
            contract: self.contract.clone(),
            function: kind.to_string(),
            args,
        };
        info!(%kind, contract = %self.contract, "handing contract call to wallet");
        guard.set_status(OpStatus::AwaitingConfirmation);
        match self.wallet.request_contract_call(request).await {
            Ok(receipt) => {
                info!(%kind, txid = %receipt.txid, "transaction broadcast");
                Ok(receipt)
            }
            Err(WalletError::Rejected) => {
                info!(%kind, "user rejected contract call");
                Err(ClientError::UserRejected)
            }
            Err(err) => {
                warn!(%kind, error = %err, "transaction broadcast failed");
                Err(ClientError::BroadcastFailed(err.to_string()))
            }
        }
    }

    /// Current ledger snapshot for one game, or `None` if the ledger has no
    /// such game. A transport or shape failure means "state unknown": the
    /// caller keeps whatever it already holds.
    pub async fn get_game(&self, game_id: u64) -> Result<Option<GameRecord>, ClientError> {
        let value = self
            .reader
            .call_read_only(
                &self.contract,
                "get-game",
                &[ClarityValue::Uint(game_id as u128)],
            )
            .await?;
        match value.into_response()?.into_optional() {
            None => Ok(None),
            Some(inner) => {
                let entries = inner.expect_tuple()?;
                Ok(Some(GameRecord::from_tuple(entries)?))
            }
        }
    }

    /// Dense board for one game. A game the ledger does not know yields an
    /// empty board; a malformed payload is a decode anomaly.
    pub async fn get_board(&self, game_id: u64) -> Result<BoardState, ClientError> {
        let value = self
            .reader
            .call_read_only(
                &self.contract,
                "get-board",
                &[ClarityValue::Uint(game_id as u128)],
            )
            .await?;
        match value.into_response()?.into_optional() {
            None => Ok(BoardState::empty()),
            Some(inner) => {
                let entries = inner.expect_tuple()?;
                Ok(decode_board(entries))
            }
        }
    }
}

/// Per-operation-kind guard: a second call of a kind already in flight is
/// rejected up front, so rapid repeated clicks cannot double-submit.
/// Different kinds may interleave; the ledger arbitrates any conflict.
struct InFlightGuard<'a> {
    table: &'a Mutex<HashMap<OpKind, PendingOperation>>,
    kind: OpKind,
}

impl<'a> InFlightGuard<'a> {
    fn begin(
        table: &'a Mutex<HashMap<OpKind, PendingOperation>>,
        kind: OpKind,
    ) -> Result<Self, ClientError> {
        let mut entries = table.lock().expect("in-flight table poisoned");
        if entries.contains_key(&kind) {
            return Err(ClientError::OperationInFlight(kind));
        }
        entries.insert(
            kind,
            PendingOperation {
                kind,
                status: OpStatus::Submitting,
            },
        );
        Ok(Self { table, kind })
    }

    fn set_status(&self, status: OpStatus) {
        let mut entries = self.table.lock().expect("in-flight table poisoned");
        if let Some(op) = entries.get_mut(&self.kind) {
            op.status = status;
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.table.lock().expect("in-flight table poisoned");
        entries.remove(&self.kind);
    }
}
