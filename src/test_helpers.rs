//! Doubles for exercising the core without a wallet extension or a node.

use crate::{
    clarity::ClarityValue,
    error::ClientError,
    gateway::{
        BroadcastReceipt,
        ChainReader,
        ContractCallRequest,
        ContractIdentity,
    },
    principal::{
        Principal,
        VERSION_TESTNET_SINGLESIG,
    },
    session::{
        SignedIdentity,
        WalletError,
        WalletProvider,
    },
};
use async_trait::async_trait;
use std::{
    collections::{
        BTreeMap,
        HashMap,
        VecDeque,
    },
    sync::{
        Mutex,
        atomic::{
            AtomicBool,
            AtomicU64,
            Ordering,
        },
    },
};
use tokio::sync::Semaphore;

pub fn test_principal(tag: u8) -> Principal {
    Principal::new(VERSION_TESTNET_SINGLESIG, [tag; 20])
}

pub fn test_contract() -> ContractIdentity {
    ContractIdentity {
        address: test_principal(0xAA),
        name: "checkers".to_string(),
    }
}

/// Builds the wire shape of a `get-game` result: `(some (tuple …))`.
pub fn game_record_value(
    player1: Principal,
    player2: Option<Principal>,
    current_turn: Principal,
    is_active: bool,
) -> ClarityValue {
    let mut entries = BTreeMap::new();
    entries.insert("player1".to_string(), ClarityValue::Principal(player1));
    entries.insert(
        "player2".to_string(),
        match player2 {
            Some(p) => ClarityValue::some(ClarityValue::Principal(p)),
            None => ClarityValue::OptionalNone,
        },
    );
    entries.insert(
        "current-turn".to_string(),
        ClarityValue::Principal(current_turn),
    );
    entries.insert("is-active".to_string(), ClarityValue::Bool(is_active));
    ClarityValue::some(ClarityValue::Tuple(entries))
}

/// Builds the wire shape of a `get-board` result: `(some (tuple pN (some uN)))`
/// with entries only for the occupied positions given.
pub fn board_value(pieces: &[(usize, u8)]) -> ClarityValue {
    let mut entries = BTreeMap::new();
    for &(position, code) in pieces {
        entries.insert(
            format!("p{position}"),
            ClarityValue::some(ClarityValue::Uint(code as u128)),
        );
    }
    ClarityValue::some(ClarityValue::Tuple(entries))
}

/// Wallet double. Sign-in state is scripted; contract calls record their
/// requests and answer from a queue (default: broadcast acknowledged).
/// A gated wallet holds every call until `approve_one` releases it, for
/// exercising the unbounded wallet suspension point.
pub struct MockWallet {
    address: Principal,
    identity: Mutex<Option<SignedIdentity>>,
    pending: AtomicBool,
    reject_sign_in: AtomicBool,
    call_results: Mutex<VecDeque<Result<BroadcastReceipt, WalletError>>>,
    calls: Mutex<Vec<ContractCallRequest>>,
    receipt_counter: AtomicU64,
    gate: Semaphore,
}

impl MockWallet {
    pub fn signed_out() -> Self {
        Self::build(test_principal(0x01), false)
    }

    pub fn signed_in(address: Principal) -> Self {
        Self::build(address, true)
    }

    fn build(address: Principal, signed_in: bool) -> Self {
        let identity = signed_in.then(|| SignedIdentity { address });
        Self {
            address,
            identity: Mutex::new(identity),
            pending: AtomicBool::new(false),
            reject_sign_in: AtomicBool::new(false),
            call_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            receipt_counter: AtomicU64::new(0),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    /// Every contract call blocks until `approve_one` is called.
    pub fn with_manual_confirmation(mut self) -> Self {
        self.gate = Semaphore::new(0);
        self
    }

    pub fn approve_one(&self) {
        self.gate.add_permits(1);
    }

    pub fn set_sign_in_pending(&self, pending: bool) {
        self.pending.store(pending, Ordering::SeqCst);
    }

    pub fn reject_sign_in(&self) {
        self.reject_sign_in.store(true, Ordering::SeqCst);
    }

    pub fn enqueue_call_result(&self, result: Result<BroadcastReceipt, WalletError>) {
        self.call_results
            .lock()
            .expect("call result queue poisoned")
            .push_back(result);
    }

    pub fn reject_next_call(&self) {
        self.enqueue_call_result(Err(WalletError::Rejected));
    }

    pub fn fail_next_call(&self, cause: &str) {
        self.enqueue_call_result(Err(WalletError::Transport(cause.to_string())));
    }

    pub fn recorded_calls(&self) -> Vec<ContractCallRequest> {
        self.calls.lock().expect("call log poisoned").clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn stored_identity(&self) -> Option<SignedIdentity> {
        self.identity.lock().expect("identity poisoned").clone()
    }

    fn sign_in_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    async fn request_sign_in(&self) -> Result<SignedIdentity, WalletError> {
        if self.reject_sign_in.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected);
        }
        let identity = SignedIdentity {
            address: self.address,
        };
        *self.identity.lock().expect("identity poisoned") = Some(identity.clone());
        Ok(identity)
    }

    fn clear_identity(&self) {
        *self.identity.lock().expect("identity poisoned") = None;
    }

    async fn request_contract_call(
        &self,
        request: ContractCallRequest,
    ) -> Result<BroadcastReceipt, WalletError> {
        let permit = self
            .gate
            .acquire()
            .await
            .expect("wallet gate closed");
        permit.forget();
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(request);
        let scripted = self
            .call_results
            .lock()
            .expect("call result queue poisoned")
            .pop_front();
        match scripted {
            Some(result) => result,
            None => {
                let n = self.receipt_counter.fetch_add(1, Ordering::SeqCst);
                Ok(BroadcastReceipt {
                    txid: format!("0xmock{n:04}"),
                })
            }
        }
    }
}

/// Chain reader double: records every query and answers from staged
/// per-game responses. Anything unstaged reads as `none`, the whole reader
/// can be switched into a failing state to script outages, and a held
/// reader keeps every response in flight until `release_one` lets it
/// through, for exercising slow-query races.
pub struct ScriptedChain {
    responses: Mutex<HashMap<(String, u64), ClarityValue>>,
    queries: Mutex<Vec<(String, u64)>>,
    failing: AtomicBool,
    gate: Semaphore,
}

impl ScriptedChain {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    /// Every query blocks after being recorded until `release_one`.
    pub fn with_held_responses(mut self) -> Self {
        self.gate = Semaphore::new(0);
        self
    }

    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    pub fn stage(&self, function: &str, game_id: u64, value: ClarityValue) {
        self.responses
            .lock()
            .expect("responses poisoned")
            .insert((function.to_string(), game_id), value);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<(String, u64)> {
        self.queries.lock().expect("query log poisoned").clone()
    }

    pub fn queried_game_ids(&self) -> Vec<u64> {
        self.queries().into_iter().map(|(_, id)| id).collect()
    }
}

impl Default for ScriptedChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainReader for ScriptedChain {
    async fn call_read_only(
        &self,
        _contract: &ContractIdentity,
        function: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ClientError> {
        let game_id = args
            .first()
            .and_then(|v| v.expect_uint().ok())
            .unwrap_or(0) as u64;
        self.queries
            .lock()
            .expect("query log poisoned")
            .push((function.to_string(), game_id));
        let permit = self.gate.acquire().await.expect("reader gate closed");
        permit.forget();
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::QueryFailed("scripted outage".to_string()));
        }
        let responses = self.responses.lock().expect("responses poisoned");
        Ok(responses
            .get(&(function.to_string(), game_id))
            .cloned()
            .unwrap_or(ClarityValue::OptionalNone))
    }
}
