use crate::{
    gateway::{
        BroadcastReceipt,
        ContractCallRequest,
    },
    principal::Principal,
};
use async_trait::async_trait;
use std::{
    fmt,
    sync::Arc,
};
use thiserror::Error;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkId {
    Mainnet,
    Testnet,
    Devnet,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Testnet => "testnet",
            NetworkId::Devnet => "devnet",
        };
        write!(f, "{name}")
    }
}

/// The user's identity as currently asserted by the external signing
/// provider. `SignInPending` is only ever derived from a provider-reported
/// resumable flow (e.g. the page was reloaded mid-authentication).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletSession {
    SignedOut,
    SignInPending,
    SignedIn {
        address: Principal,
        network: NetworkId,
    },
}

impl WalletSession {
    pub fn address(&self) -> Option<&Principal> {
        match self {
            WalletSession::SignedIn { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, WalletSession::SignedIn { .. })
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("user rejected the request")]
    Rejected,
    #[error("wallet transport error: {0}")]
    Transport(String),
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

/// Identity material the provider keeps across reloads. Owned by the
/// provider, only read here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedIdentity {
    pub address: Principal,
}

/// The external wallet as an opaque asynchronous capability: sign-in and
/// contract-call confirmation both suspend until the user acts, and may
/// never resolve if the flow is abandoned. No timeout is imposed here.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Identity from an already-established stored session, if any.
    fn stored_identity(&self) -> Option<SignedIdentity>;

    /// Whether a redirect-based sign-in flow is mid-completion.
    fn sign_in_pending(&self) -> bool;

    async fn request_sign_in(&self) -> Result<SignedIdentity, WalletError>;

    /// Clears locally derived identity. Wallet-side trust is untouched.
    fn clear_identity(&self);

    /// Prompts the user to confirm, sign, and broadcast one contract call.
    /// A receipt is a broadcast acknowledgment, not ledger finality.
    async fn request_contract_call(
        &self,
        request: ContractCallRequest,
    ) -> Result<BroadcastReceipt, WalletError>;
}

/// Owns the session lifecycle: `SignedOut → connect → SignedIn →
/// disconnect → SignedOut`. Constructed explicitly and injected wherever a
/// session is needed; there is deliberately no global instance.
pub struct SessionManager<W> {
    provider: Arc<W>,
    network: NetworkId,
}

impl<W: WalletProvider> SessionManager<W> {
    pub fn new(provider: Arc<W>, network: NetworkId) -> Self {
        Self { provider, network }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn provider(&self) -> &Arc<W> {
        &self.provider
    }

    /// Hands control to the wallet's authentication flow and suspends until
    /// it completes. May never resolve if the user abandons the flow.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        let identity = self.provider.request_sign_in().await?;
        info!(address = %identity.address, network = %self.network, "wallet session established");
        Ok(WalletSession::SignedIn {
            address: identity.address,
            network: self.network,
        })
    }

    pub fn disconnect(&self) {
        self.provider.clear_identity();
        info!("wallet session cleared");
    }

    /// Current status, consulting the in-progress sign-in continuation
    /// before the stored session.
    pub fn current_session(&self) -> WalletSession {
        if self.provider.sign_in_pending() {
            return WalletSession::SignInPending;
        }
        match self.provider.stored_identity() {
            Some(identity) => WalletSession::SignedIn {
                address: identity.address,
                network: self.network,
            },
            None => WalletSession::SignedOut,
        }
    }
}

/// Provider for headless, read-only use: never signed in, refuses to sign.
pub struct WatchOnlyWallet;

#[async_trait]
impl WalletProvider for WatchOnlyWallet {
    fn stored_identity(&self) -> Option<SignedIdentity> {
        None
    }

    fn sign_in_pending(&self) -> bool {
        false
    }

    async fn request_sign_in(&self) -> Result<SignedIdentity, WalletError> {
        Err(WalletError::Unavailable(
            "watch-only mode has no signing wallet".to_string(),
        ))
    }

    fn clear_identity(&self) {}

    async fn request_contract_call(
        &self,
        _request: ContractCallRequest,
    ) -> Result<BroadcastReceipt, WalletError> {
        Err(WalletError::Unavailable(
            "watch-only mode cannot submit transactions".to_string(),
        ))
    }
}
